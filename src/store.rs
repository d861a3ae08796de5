use std::path::Path;

use redb::{
    Database,
    ReadableDatabase,
    ReadableTable,
    ReadableTableMetadata,
    TableDefinition,
};

use crate::{
    entry::DictionaryEntry,
    error::{Error, Result},
    merge::ImportSummary,
};

/// Stable key → entry JSON.
const USER_ENTRIES: TableDefinition<&str, &str> =
    TableDefinition::new("user_entries");
const SETTINGS: TableDefinition<&str, &str> = TableDefinition::new("settings");

const LAST_IMPORT_SUMMARY: &str = "last_import_summary";

/// Persistent user-side state: imported entries, the last import summary
/// and settings. Default entries are never written here.
pub struct EntryStore {
    db: Database,
}

impl EntryStore {
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path)?;

        // Ensure all tables exist by opening them in a write transaction.
        let txn = db.begin_write()?;
        txn.open_table(USER_ENTRIES)?;
        txn.open_table(SETTINGS)?;
        txn.commit()?;

        Ok(Self { db })
    }

    // -- User entries --

    /// All user entries, ordered by stable key.
    pub fn user_entries(&self) -> Result<Vec<DictionaryEntry>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(USER_ENTRIES)?;
        let mut result = Vec::new();
        for entry in table.iter()? {
            let (_key, value) = entry?;
            result.push(serde_json::from_str(value.value())?);
        }
        Ok(result)
    }

    pub fn user_entry_count(&self) -> Result<u64> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(USER_ENTRIES)?;
        Ok(table.len()?)
    }

    /// Replace the whole user entry set and record `summary`, in one
    /// transaction.
    pub fn replace_user_entries(
        &self,
        entries: &[DictionaryEntry],
        summary: &ImportSummary,
    ) -> Result<()> {
        let rows = entries
            .iter()
            .map(|e| serde_json::to_string(e).map(|json| (e.stable_key(), json)))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let summary = serde_json::to_string(summary)?;

        let txn = self.db.begin_write()?;
        txn.delete_table(USER_ENTRIES)?;
        {
            let mut table = txn.open_table(USER_ENTRIES)?;
            for (key, json) in &rows {
                table.insert(key.as_str(), json.as_str())?;
            }
            let mut settings = txn.open_table(SETTINGS)?;
            settings.insert(LAST_IMPORT_SUMMARY, summary.as_str())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Drop every user entry and the last import summary.
    pub fn clear_user_entries(&self) -> Result<()> {
        let txn = self.db.begin_write()?;
        txn.delete_table(USER_ENTRIES)?;
        txn.open_table(USER_ENTRIES)?;
        {
            let mut settings = txn.open_table(SETTINGS)?;
            settings.remove(LAST_IMPORT_SUMMARY)?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn last_import_summary(&self) -> Result<Option<ImportSummary>> {
        self.get_setting(LAST_IMPORT_SUMMARY)?
            .map(|json| serde_json::from_str(&json).map_err(Error::from))
            .transpose()
    }

    // -- Settings --

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(SETTINGS)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(SETTINGS)?;
        Ok(table.get(key)?.map(|v| v.value().to_string()))
    }

    /// Get a setting, returning the default if not set.
    pub fn get_setting_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self
            .get_setting(key)?
            .unwrap_or_else(|| default.to_string()))
    }
}

impl std::fmt::Debug for EntryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryStore").finish_non_exhaustive()
    }
}
