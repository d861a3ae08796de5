use serde::Serialize;

use crate::entry::DictionaryEntry;

/// Code suffixes that stay uppercase in snake case (`USE_YN` → `use_YN`).
pub const SUFFIX_CODES: &[&str] = &["YN", "CD", "NO", "SN", "DT", "DTTM"];

/// Identifier spellings for one dictionary name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameVariants {
    pub camel: String,
    pub snake: String,
    pub pascal: String,
}

fn tokenize(base: &str) -> Vec<String> {
    base.trim()
        .split(['_', '-'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_uppercase)
        .collect()
}

fn capitalize(token: &str) -> String {
    let lower = token.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Spell `base` (typically an abbreviation such as `CUST_NM`) as camel,
/// snake and pascal case identifiers.
///
/// # Examples
///
/// ```
/// use stddict::naming::variants;
///
/// let v = variants("CUST_USE_YN");
/// assert_eq!(v.camel, "custUseYn");
/// assert_eq!(v.snake, "cust_use_YN");
/// assert_eq!(v.pascal, "CustUseYn");
/// ```
pub fn variants(base: &str) -> NameVariants {
    let tokens = tokenize(base);

    let camel = tokens
        .iter()
        .enumerate()
        .map(|(i, t)| if i == 0 { t.to_lowercase() } else { capitalize(t) })
        .collect();
    let pascal = tokens.iter().map(|t| capitalize(t)).collect();
    let snake = tokens
        .iter()
        .map(|t| {
            if SUFFIX_CODES.contains(&t.as_str()) {
                t.clone()
            } else {
                t.to_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join("_");

    NameVariants {
        camel,
        snake,
        pascal,
    }
}

/// Variants built from the entry's base name.
pub fn for_entry(entry: &DictionaryEntry) -> NameVariants {
    variants(entry.base_name())
}
