//! Reconciles the default entry set, earlier user imports and a new batch.
//!
//! Everything here is a pure function over entry slices: the caller owns
//! persistence and must serialize imports against each other.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    entry::{DictionaryEntry, EntrySource},
    text_util::non_blank,
};

/// Version given to a fresh override of a default entry, one past the
/// implicit version 1 of every default.
pub const FIRST_OVERRIDE_VERSION: u32 = 2;

/// Counts produced by one import. `added`, `merged` and `skipped` partition
/// the batch; `conflicted` counts entries where an incoming value was
/// discarded in favour of a different existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub imported_at: DateTime<Utc>,
    pub added: usize,
    pub merged: usize,
    pub skipped: usize,
    pub conflicted: usize,
}

impl ImportSummary {
    fn empty(imported_at: DateTime<Utc>) -> Self {
        Self {
            imported_at,
            added: 0,
            merged: 0,
            skipped: 0,
            conflicted: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.added + self.merged + self.skipped
    }
}

/// The new user entry set plus the summary describing how it was reached.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub user_entries: Vec<DictionaryEntry>,
    pub summary: ImportSummary,
}

fn fill(existing: &Option<String>, incoming: &Option<String>) -> Option<String> {
    // A blank incoming value never replaces anything, not even a blank.
    match (non_blank(existing.as_deref()), non_blank(incoming.as_deref())) {
        (None, Some(_)) => incoming.clone(),
        _ => existing.clone(),
    }
}

fn union(a: &BTreeSet<String>, b: &BTreeSet<String>) -> BTreeSet<String> {
    a.iter()
        .chain(b)
        .filter(|s| !s.trim().is_empty())
        .cloned()
        .collect()
}

fn without_blanks(set: &BTreeSet<String>) -> BTreeSet<String> {
    union(set, &BTreeSet::new())
}

fn scalar_fields(e: &DictionaryEntry) -> [Option<&str>; 13] {
    [
        e.english_abbreviation.as_deref(),
        e.english_name.as_deref(),
        e.description.as_deref(),
        e.domain_group.as_deref(),
        e.domain_category.as_deref(),
        e.domain_name.as_deref(),
        e.data_type.as_deref(),
        e.data_length.as_deref(),
        e.data_scale.as_deref(),
        e.storage_format.as_deref(),
        e.display_format.as_deref(),
        e.unit.as_deref(),
        e.allowed_values.as_deref(),
    ]
}

/// Field-level merge where `existing` always wins.
///
/// Optional scalars keep the existing value unless it is blank; synonym and
/// forbidden-word sets are unioned with blanks dropped. Every other field
/// (kind, korean name, provenance, version) comes from `existing`.
pub fn merge_fields(
    existing: &DictionaryEntry,
    incoming: &DictionaryEntry,
) -> DictionaryEntry {
    DictionaryEntry {
        kind: existing.kind,
        korean_name: existing.korean_name.clone(),
        english_abbreviation: fill(
            &existing.english_abbreviation,
            &incoming.english_abbreviation,
        ),
        english_name: fill(&existing.english_name, &incoming.english_name),
        description: fill(&existing.description, &incoming.description),
        domain_group: fill(&existing.domain_group, &incoming.domain_group),
        domain_category: fill(
            &existing.domain_category,
            &incoming.domain_category,
        ),
        domain_name: fill(&existing.domain_name, &incoming.domain_name),
        data_type: fill(&existing.data_type, &incoming.data_type),
        data_length: fill(&existing.data_length, &incoming.data_length),
        data_scale: fill(&existing.data_scale, &incoming.data_scale),
        storage_format: fill(&existing.storage_format, &incoming.storage_format),
        display_format: fill(&existing.display_format, &incoming.display_format),
        unit: fill(&existing.unit, &incoming.unit),
        allowed_values: fill(&existing.allowed_values, &incoming.allowed_values),
        synonyms: union(&existing.synonyms, &incoming.synonyms),
        forbidden_words: union(&existing.forbidden_words, &incoming.forbidden_words),
        source: existing.source,
        imported_at: existing.imported_at,
        version: existing.version,
    }
}

/// True when merging `incoming` into `existing` throws away information:
/// a different kind, or a non-blank incoming scalar that loses to a
/// different non-blank existing one.
pub fn has_conflict(existing: &DictionaryEntry, incoming: &DictionaryEntry) -> bool {
    if existing.kind != incoming.kind {
        return true;
    }
    scalar_fields(existing)
        .into_iter()
        .zip(scalar_fields(incoming))
        .any(|(old, new)| match (non_blank(old), non_blank(new)) {
            (Some(old), Some(new)) => old.trim() != new.trim(),
            _ => false,
        })
}

/// Reconcile `incoming` into the user entry set.
///
/// Per incoming entry, by stable key:
/// 1. already a user entry: merge into it; a change bumps its version
/// 2. only a default: merge into the default; a change becomes a new
///    override at [`FIRST_OVERRIDE_VERSION`]
/// 3. unseen: added as-is
///
/// Anything that ends up changed or added is marked
/// [`EntrySource::Imported`] and stamped with `imported_at`. Merges never
/// overwrite a non-blank value, so feeding the same batch twice skips
/// every entry the second time.
pub fn import_entries<I>(
    defaults: &[DictionaryEntry],
    user: &[DictionaryEntry],
    incoming: I,
    imported_at: DateTime<Utc>,
) -> ImportOutcome
where
    I: IntoIterator<Item = DictionaryEntry>,
{
    let default_by_key: HashMap<String, &DictionaryEntry> =
        defaults.iter().map(|e| (e.stable_key(), e)).collect();

    let mut user_entries: Vec<DictionaryEntry> = user.to_vec();
    let mut user_by_key: HashMap<String, usize> = user_entries
        .iter()
        .enumerate()
        .map(|(i, e)| (e.stable_key(), i))
        .collect();

    let mut summary = ImportSummary::empty(imported_at);

    for entry in incoming {
        let key = entry.stable_key();

        let existing = match user_by_key.get(&key) {
            Some(&slot) => Some((Some(slot), &user_entries[slot])),
            None => default_by_key.get(&key).map(|d| (None, *d)),
        };

        match existing {
            Some((slot, current)) => {
                if has_conflict(current, &entry) {
                    summary.conflicted += 1;
                }
                let merged = merge_fields(current, &entry);
                if merged == *current {
                    summary.skipped += 1;
                    continue;
                }
                let version = match slot {
                    Some(_) => current.version + 1,
                    None => FIRST_OVERRIDE_VERSION,
                };
                let updated = DictionaryEntry {
                    source: EntrySource::Imported,
                    imported_at: Some(imported_at),
                    version,
                    ..merged
                };
                match slot {
                    Some(slot) => user_entries[slot] = updated,
                    None => {
                        user_by_key.insert(key, user_entries.len());
                        user_entries.push(updated);
                    }
                }
                summary.merged += 1;
            }
            None => {
                let added = DictionaryEntry {
                    synonyms: without_blanks(&entry.synonyms),
                    forbidden_words: without_blanks(&entry.forbidden_words),
                    source: EntrySource::Imported,
                    imported_at: Some(imported_at),
                    ..entry
                };
                user_by_key.insert(key, user_entries.len());
                user_entries.push(added);
                summary.added += 1;
            }
        }
    }

    ImportOutcome {
        user_entries,
        summary,
    }
}

/// Overlay user entries onto the defaults by stable key.
///
/// A user entry sharing a key with a default is merged over it with the
/// user side winning; source and version stay those of the user entry.
/// The result holds at most one entry per key, in default order followed
/// by user-only entries. With `override_only` the defaults are ignored.
pub fn effective_entries(
    defaults: &[DictionaryEntry],
    user: &[DictionaryEntry],
    override_only: bool,
) -> Vec<DictionaryEntry> {
    let base: &[DictionaryEntry] = if override_only { &[] } else { defaults };

    let mut out: Vec<DictionaryEntry> = Vec::with_capacity(base.len() + user.len());
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(out.capacity());

    for entry in base.iter().chain(user) {
        let key = entry.stable_key();
        match slots.get(&key) {
            Some(&slot) => out[slot] = merge_fields(entry, &out[slot]),
            None => {
                slots.insert(key, out.len());
                out.push(entry.clone());
            }
        }
    }

    out
}
