use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{SubsecRound, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    batch::decode_batch,
    config::DictionaryConfig,
    dictionary_index::{DictionaryIndex, Query},
    entry::DictionaryEntry,
    error::{Error, Result},
    merge::{self, ImportSummary},
    store::EntryStore,
};

/// A search hit detached from the index snapshot it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub entry: DictionaryEntry,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DictionaryStatus {
    /// Entries in the published index.
    pub entries: usize,
    pub default_entries: usize,
    pub user_entries: u64,
    pub override_only: bool,
    pub result_limit: usize,
    pub last_import: Option<ImportSummary>,
}

/// Owns the dictionary state and keeps the search index in step with it.
///
/// Imports, resets and mode changes are serialized by one mutex and each
/// finishes by building a fresh [`DictionaryIndex`] and publishing it with
/// a single `Arc` swap. Searches only clone the current `Arc`, so they
/// never wait on a build and never observe a half-built index.
pub struct DictionaryService {
    store: EntryStore,
    defaults: Vec<DictionaryEntry>,
    write_lock: Mutex<()>,
    index: RwLock<Arc<DictionaryIndex>>,
}

impl DictionaryService {
    pub fn open(store: EntryStore, defaults: Vec<DictionaryEntry>) -> Result<Self> {
        let service = Self {
            store,
            defaults,
            write_lock: Mutex::new(()),
            index: RwLock::new(Arc::new(DictionaryIndex::build(Vec::new()))),
        };
        service.rebuild_index()?;
        Ok(service)
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn defaults(&self) -> &[DictionaryEntry] {
        &self.defaults
    }

    pub fn config(&self) -> Result<DictionaryConfig> {
        DictionaryConfig::load(&self.store)
    }

    /// Defaults overlaid by user entries, or the user entries alone in
    /// override-only mode.
    pub fn effective_entries(&self) -> Result<Vec<DictionaryEntry>> {
        let config = self.config()?;
        let user = self.store.user_entries()?;
        Ok(merge::effective_entries(
            &self.defaults,
            &user,
            config.override_only,
        ))
    }

    /// The currently published index snapshot.
    pub fn index(&self) -> Arc<DictionaryIndex> {
        let guard = self.index.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn search(&self, query: &Query, limit: usize) -> Vec<SearchHit> {
        self.index()
            .search(query, limit)
            .into_iter()
            .map(|r| SearchHit {
                entry: r.entry.clone(),
                score: r.score,
            })
            .collect()
    }

    /// Decode a JSON batch and import it. A batch that fails to decode
    /// changes nothing.
    pub fn import_json(&self, json: &str) -> Result<ImportSummary> {
        let batch = decode_batch(json)?;
        self.import_entries(batch)
    }

    pub fn import_entries(
        &self,
        batch: Vec<DictionaryEntry>,
    ) -> Result<ImportSummary> {
        let _guard = self.lock_writes();

        let user = self.store.user_entries()?;
        // Stored timestamps have millisecond precision.
        let imported_at = Utc::now().trunc_subsecs(3);
        let outcome =
            merge::import_entries(&self.defaults, &user, batch, imported_at);
        self.store
            .replace_user_entries(&outcome.user_entries, &outcome.summary)?;

        let summary = outcome.summary;
        info!(
            added = summary.added,
            merged = summary.merged,
            skipped = summary.skipped,
            conflicted = summary.conflicted,
            "import finished"
        );

        self.publish_index()?;
        Ok(summary)
    }

    /// Run [`import_json`](Self::import_json) on the blocking pool.
    /// Searches keep using the previous index until the new one is
    /// published.
    pub async fn import_json_in_background(
        self: Arc<Self>,
        json: String,
    ) -> Result<ImportSummary> {
        tokio::task::spawn_blocking(move || self.import_json(&json))
            .await
            .map_err(|e| Error::Background(e.to_string()))?
    }

    /// Discard every user entry and the last import summary.
    pub fn reset(&self) -> Result<()> {
        let _guard = self.lock_writes();
        self.store.clear_user_entries()?;
        info!("user entries reset to defaults");
        self.publish_index()?;
        Ok(())
    }

    pub fn set_override_only(&self, override_only: bool) -> Result<()> {
        let _guard = self.lock_writes();
        let config = DictionaryConfig {
            override_only,
            ..self.config()?
        };
        config.save(&self.store)?;
        self.publish_index()?;
        Ok(())
    }

    /// Rebuild the index from the stored state and publish it. Returns the
    /// number of indexed entries.
    pub fn rebuild_index(&self) -> Result<usize> {
        let _guard = self.lock_writes();
        self.publish_index()
    }

    pub fn status(&self) -> Result<DictionaryStatus> {
        let config = self.config()?;
        Ok(DictionaryStatus {
            entries: self.index().len(),
            default_entries: self.defaults.len(),
            user_entries: self.store.user_entry_count()?,
            override_only: config.override_only,
            result_limit: config.result_limit,
            last_import: self.store.last_import_summary()?,
        })
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        // The guarded value is `()`, a panicked holder leaves nothing
        // inconsistent behind.
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Caller must hold the write lock.
    fn publish_index(&self) -> Result<usize> {
        let index = Arc::new(DictionaryIndex::build(self.effective_entries()?));
        let len = index.len();
        *self.index.write().unwrap_or_else(PoisonError::into_inner) = index;
        debug!(entries = len, "published index");
        Ok(len)
    }
}

impl std::fmt::Debug for DictionaryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictionaryService")
            .field("defaults", &self.defaults.len())
            .finish_non_exhaustive()
    }
}
