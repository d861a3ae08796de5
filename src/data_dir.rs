use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Root of everything stddict keeps on disk:
///
/// ```text
/// <root>/
///   dictionary.redb    user entries, last import summary, settings
///   defaults/
///     terms.json       default entry set, one JSON array per sheet;
///     words.json       any of the three may be missing
///     domains.json
/// ```
///
/// The defaults are only read, never written. `--defaults-dir` points the
/// CLI at another directory with the same three files.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Resolve the data directory from, in order of priority:
    /// 1. An explicit path (from --data-dir)
    /// 2. The STDDICT_DATA_DIR environment variable
    /// 3. The XDG data directory (~/.local/share/stddict/)
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let root = if let Some(path) = explicit {
            path.to_path_buf()
        } else if let Ok(val) = std::env::var("STDDICT_DATA_DIR") {
            PathBuf::from(val)
        } else {
            xdg::BaseDirectories::with_prefix("stddict")
                .get_data_home()
                .ok_or_else(|| {
                    Error::Config(
                        "could not determine XDG data home directory".into(),
                    )
                })?
        };

        std::fs::create_dir_all(&root)
            .map_err(|_| Error::DataDir(root.clone()))?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The redb file. Created on first open; deleting it is the same as a
    /// reset plus clearing every setting.
    pub fn store_db(&self) -> PathBuf {
        self.root.join("dictionary.redb")
    }

    /// Where `terms.json`, `words.json` and `domains.json` are read from.
    /// Not created by [`resolve`](Self::resolve); a missing directory means
    /// an empty default set.
    pub fn defaults_dir(&self) -> PathBuf {
        self.root.join("defaults")
    }
}
