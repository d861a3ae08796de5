use serde::Serialize;

use crate::{
    error::{Error, Result},
    store::EntryStore,
};

pub const OVERRIDE_ONLY_KEY: &str = "override_only";
pub const RESULT_LIMIT_KEY: &str = "result_limit";

pub const DEFAULT_RESULT_LIMIT: usize = 20;

/// Settings consumed by the lookup path, persisted in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DictionaryConfig {
    /// Present only user entries instead of defaults overlaid by them.
    pub override_only: bool,
    /// Result count used when the caller does not give one.
    pub result_limit: usize,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            override_only: false,
            result_limit: DEFAULT_RESULT_LIMIT,
        }
    }
}

impl DictionaryConfig {
    pub fn load(store: &EntryStore) -> Result<Self> {
        Ok(Self {
            override_only: parse_bool(
                &store.get_setting_or(OVERRIDE_ONLY_KEY, "false")?,
            )?,
            result_limit: parse_limit(&store.get_setting_or(
                RESULT_LIMIT_KEY,
                &DEFAULT_RESULT_LIMIT.to_string(),
            )?)?,
        })
    }

    pub fn save(&self, store: &EntryStore) -> Result<()> {
        store.set_setting(
            OVERRIDE_ONLY_KEY,
            if self.override_only { "true" } else { "false" },
        )?;
        store.set_setting(RESULT_LIMIT_KEY, &self.result_limit.to_string())
    }
}

/// Accepts `true/false`, `yes/no`, `on/off` and `1/0`.
pub fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(Error::Config(format!("not a boolean: '{other}'"))),
    }
}

pub fn parse_limit(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(Error::Config(format!(
            "result limit must be a positive integer, got '{raw}'"
        ))),
        Ok(n) => Ok(n),
    }
}
