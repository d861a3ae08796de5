use std::path::Path;

use tracing::{debug, warn};

use crate::{
    entry::{DictionaryEntry, EntrySource},
    error::Result,
};

/// Default entry files, one per sheet, in load order.
pub const DEFAULT_FILES: [&str; 3] = ["terms.json", "words.json", "domains.json"];

/// Load the bundled default entry set from `dir`.
///
/// Missing files contribute nothing. A file that does not parse is logged
/// and skipped so one broken sheet does not hide the others. Every entry is
/// marked [`EntrySource::Default`].
pub fn load_default_entries(dir: &Path) -> Result<Vec<DictionaryEntry>> {
    let mut entries = Vec::new();

    for name in DEFAULT_FILES {
        let path = dir.join(name);
        if !path.is_file() {
            debug!(path = %path.display(), "no default entry file");
            continue;
        }

        let content = std::fs::read_to_string(&path)?;
        match serde_json::from_str::<Vec<DictionaryEntry>>(&content) {
            Ok(loaded) => {
                debug!(path = %path.display(), count = loaded.len(), "loaded defaults");
                entries.extend(loaded.into_iter().map(|e| DictionaryEntry {
                    source: EntrySource::Default,
                    ..e
                }));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping malformed default entry file");
            }
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;

    #[test]
    fn loads_all_sheets_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("domains.json"),
            r#"[{"type": "DOMAIN", "koName": "금액N15", "domainName": "금액N15"}]"#,
        )
        .unwrap();
        std::fs::write(
            tmp.path().join("terms.json"),
            r#"[{"type": "TERM", "koName": "고객명", "source": "XLSX"}]"#,
        )
        .unwrap();

        let entries = load_default_entries(tmp.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, EntryKind::Term);
        assert_eq!(entries[1].kind, EntryKind::Domain);
        assert!(entries.iter().all(|e| e.source == EntrySource::Default));
    }

    #[test]
    fn missing_directory_yields_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let entries = load_default_entries(&tmp.path().join("absent")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn malformed_file_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("terms.json"), "not json").unwrap();
        std::fs::write(
            tmp.path().join("words.json"),
            r#"[{"type": "WORD", "koName": "고객", "enAbbr": "CUST"}]"#,
        )
        .unwrap();

        let entries = load_default_entries(tmp.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].korean_name, "고객");
    }
}
