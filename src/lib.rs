//! stddict - a standard dictionary of terms, words and domains.
//!
//! A fixed default entry set is overlaid by user imports. Imports merge
//! field by field under a stable key, and every change publishes a fresh
//! immutable prefix index that ranks entries by where the query matched,
//! with a bounded edit-distance fallback for near misses.
//!
//! # Quick start
//!
//! ```no_run
//! use stddict::{DataDir, DictionaryService, EntryStore, Query, defaults};
//!
//! let data_dir = DataDir::resolve(None).unwrap();
//! let defaults =
//!     defaults::load_default_entries(&data_dir.defaults_dir()).unwrap();
//! let store = EntryStore::open(&data_dir.store_db()).unwrap();
//! let service = DictionaryService::open(store, defaults).unwrap();
//!
//! let summary = service
//!     .import_json(r#"[{"type": "WORD", "koName": "고객", "enAbbr": "CUST"}]"#)
//!     .unwrap();
//! println!("{} added, {} merged", summary.added, summary.merged);
//!
//! for hit in service.search(&Query::new("고객"), 10) {
//!     println!("{} {} ({})", hit.score, hit.entry.korean_name, hit.entry.kind);
//! }
//! ```

pub mod batch;
pub mod cli;
pub mod config;
pub mod data_dir;
pub mod defaults;
pub mod dictionary_index;
pub mod entry;
pub mod error;
pub mod merge;
pub mod naming;
pub mod scoring;
pub mod search;
pub mod service;
pub mod store;
pub mod text_util;

pub use config::DictionaryConfig;
pub use data_dir::DataDir;
pub use dictionary_index::{DictionaryIndex, Query, Ranked};
pub use entry::{DictionaryEntry, EntryKind, EntrySource};
pub use error::{Error, Result};
pub use merge::{ImportOutcome, ImportSummary};
pub use service::{DictionaryService, DictionaryStatus, SearchHit};
pub use store::EntryStore;
