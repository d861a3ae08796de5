use std::{collections::BTreeSet, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    text_util::{collapse_whitespace, non_blank},
};

/// The three sheets of the standard dictionary.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    Term,
    Word,
    Domain,
}

impl EntryKind {
    pub const ALL: [EntryKind; 3] =
        [EntryKind::Term, EntryKind::Word, EntryKind::Domain];

    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Term => "term",
            EntryKind::Word => "word",
            EntryKind::Domain => "domain",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntryKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::Config(format!(
                    "unknown entry kind '{s}' (expected term, word or domain)"
                ))
            })
    }
}

/// Where an entry came from. Only the merge engine changes this.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntrySource {
    #[default]
    Default,
    /// Older exports label spreadsheet imports `XLSX`.
    #[serde(alias = "XLSX")]
    Imported,
    User,
}

fn initial_version() -> u32 {
    1
}

/// One row of the standard dictionary: a term, a word or a domain.
///
/// Entries are plain values. Merging never edits one in place; it builds a
/// new entry and bumps `version` when anything changed.
///
/// The serde shape is the camelCase JSON used by the bundled default files
/// and by import batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    #[serde(rename = "type", alias = "kind")]
    pub kind: EntryKind,
    #[serde(rename = "koName", alias = "koreanName")]
    pub korean_name: String,
    #[serde(
        rename = "enAbbr",
        alias = "englishAbbreviation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub english_abbreviation: Option<String>,
    #[serde(
        rename = "enName",
        alias = "englishName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub english_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_scale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<String>,
    #[serde(default)]
    pub synonyms: BTreeSet<String>,
    #[serde(default)]
    pub forbidden_words: BTreeSet<String>,
    #[serde(default)]
    pub source: EntrySource,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub imported_at: Option<DateTime<Utc>>,
    #[serde(default = "initial_version")]
    pub version: u32,
}

impl DictionaryEntry {
    /// A bare entry with only the required korean name set.
    pub fn new(kind: EntryKind, korean_name: impl Into<String>) -> Self {
        Self {
            kind,
            korean_name: korean_name.into(),
            english_abbreviation: None,
            english_name: None,
            description: None,
            domain_group: None,
            domain_category: None,
            domain_name: None,
            data_type: None,
            data_length: None,
            data_scale: None,
            storage_format: None,
            display_format: None,
            unit: None,
            allowed_values: None,
            synonyms: BTreeSet::new(),
            forbidden_words: BTreeSet::new(),
            source: EntrySource::Default,
            imported_at: None,
            version: initial_version(),
        }
    }

    pub fn with_abbreviation(mut self, abbreviation: impl Into<String>) -> Self {
        self.english_abbreviation = Some(abbreviation.into());
        self
    }

    pub fn with_english_name(mut self, name: impl Into<String>) -> Self {
        self.english_name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_domain(
        mut self,
        group: impl Into<String>,
        category: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.domain_group = Some(group.into());
        self.domain_category = Some(category.into());
        self.domain_name = Some(name.into());
        self
    }

    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_source(mut self, source: EntrySource) -> Self {
        self.source = source;
        self
    }

    /// Identity used to recognise the same logical entry across the
    /// default set, earlier imports and new batches.
    ///
    /// - term: trimmed abbreviation, else the whitespace-collapsed korean name
    /// - word: trimmed, uppercased abbreviation, else the korean name
    /// - domain: whitespace-collapsed domain name, else the korean name
    ///
    /// # Examples
    ///
    /// ```
    /// use stddict::entry::{DictionaryEntry, EntryKind};
    ///
    /// let word = DictionaryEntry::new(EntryKind::Word, "단어").with_abbreviation(" word ");
    /// assert_eq!(word.stable_key(), "WORD");
    ///
    /// let term = DictionaryEntry::new(EntryKind::Term, "  공통  표준  용어명 ");
    /// assert_eq!(term.stable_key(), "공통 표준 용어명");
    /// ```
    pub fn stable_key(&self) -> String {
        let abbreviation = non_blank(self.english_abbreviation.as_deref());
        match self.kind {
            EntryKind::Term => match abbreviation {
                Some(abbr) => abbr.trim().to_string(),
                None => collapse_whitespace(&self.korean_name),
            },
            EntryKind::Word => match abbreviation {
                Some(abbr) => abbr.trim().to_uppercase(),
                None => collapse_whitespace(&self.korean_name),
            },
            EntryKind::Domain => collapse_whitespace(
                non_blank(self.domain_name.as_deref())
                    .unwrap_or(&self.korean_name),
            ),
        }
    }

    /// The trimmed korean name, abbreviation and english name, blanks
    /// skipped. A subset of [`all_tokens`](Self::all_tokens).
    pub fn name_tokens(&self) -> BTreeSet<String> {
        [
            Some(self.korean_name.as_str()),
            self.english_abbreviation.as_deref(),
            self.english_name.as_deref(),
        ]
        .into_iter()
        .filter_map(non_blank)
        .map(|s| s.trim().to_string())
        .collect()
    }

    /// Raw, trimmed strings this entry is findable by: names, description
    /// and synonyms. Blank values are skipped.
    pub fn all_tokens(&self) -> BTreeSet<String> {
        [
            Some(self.korean_name.as_str()),
            self.english_abbreviation.as_deref(),
            self.english_name.as_deref(),
            self.description.as_deref(),
        ]
        .into_iter()
        .chain(self.synonyms.iter().map(|s| Some(s.as_str())))
        .filter_map(non_blank)
        .map(|s| s.trim().to_string())
        .collect()
    }

    /// The first available of abbreviation, english name and korean name.
    /// Identifier generation starts from this.
    pub fn base_name(&self) -> &str {
        non_blank(self.english_abbreviation.as_deref())
            .or_else(|| non_blank(self.english_name.as_deref()))
            .unwrap_or(&self.korean_name)
            .trim()
    }
}
