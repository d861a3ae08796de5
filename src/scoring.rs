use crate::{
    entry::{DictionaryEntry, EntryKind},
    text_util::{bounded_levenshtein, non_blank, normalize},
};

/// Points for an exact, prefix or substring match on one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldWeights {
    pub exact: u32,
    pub prefix: u32,
    pub contains: u32,
}

impl FieldWeights {
    /// Points for `value` against `key`; both already normalized.
    pub fn score(&self, value: &str, key: &str) -> u32 {
        if value == key {
            self.exact
        } else if value.starts_with(key) {
            self.prefix
        } else if value.contains(key) {
            self.contains
        } else {
            0
        }
    }
}

/// A name field and its weights.
#[derive(Clone, Copy)]
pub struct ScoredField {
    pub name: &'static str,
    pub value: fn(&DictionaryEntry) -> Option<&str>,
    pub weights: FieldWeights,
}

impl std::fmt::Debug for ScoredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoredField")
            .field("name", &self.name)
            .field("weights", &self.weights)
            .finish_non_exhaustive()
    }
}

fn korean_name(e: &DictionaryEntry) -> Option<&str> {
    Some(&e.korean_name)
}

fn abbreviation(e: &DictionaryEntry) -> Option<&str> {
    e.english_abbreviation.as_deref()
}

fn english_name(e: &DictionaryEntry) -> Option<&str> {
    e.english_name.as_deref()
}

/// Name fields in priority order. This table is the only place the name
/// weights live.
pub const NAME_FIELDS: [ScoredField; 3] = [
    ScoredField {
        name: "korean_name",
        value: korean_name,
        weights: FieldWeights {
            exact: 2000,
            prefix: 800,
            contains: 400,
        },
    },
    ScoredField {
        name: "abbreviation",
        value: abbreviation,
        weights: FieldWeights {
            exact: 1900,
            prefix: 750,
            contains: 380,
        },
    },
    ScoredField {
        name: "english_name",
        value: english_name,
        weights: FieldWeights {
            exact: 1800,
            prefix: 700,
            contains: 350,
        },
    },
];

pub const SYNONYM_EXACT: u32 = 200;
pub const SYNONYM_PREFIX: u32 = 100;
pub const DESCRIPTION_CONTAINS: u32 = 50;

/// Fuzzy matching only runs while the textual score is below the korean
/// name "contains" tier.
pub const FUZZY_THRESHOLD: u32 = NAME_FIELDS[0].weights.contains;
pub const FUZZY_BASE: u32 = 100;
pub const FUZZY_STEP: u32 = 30;
pub const MAX_FUZZY_DISTANCE: usize = 2;

/// Tie-break bonus, more specific kinds first.
pub fn kind_bonus(kind: EntryKind) -> u32 {
    match kind {
        EntryKind::Term => 30,
        EntryKind::Word => 20,
        EntryKind::Domain => 10,
    }
}

/// Largest edit distance accepted for a key of `key_chars` characters.
pub fn fuzzy_budget(key_chars: usize) -> usize {
    MAX_FUZZY_DISTANCE.min(key_chars / 2)
}

/// Score `entry` against a normalized, non-empty query key.
///
/// Returns 0 when nothing textual matched. The kind bonus only breaks ties
/// between entries that matched something.
pub fn score(entry: &DictionaryEntry, key: &str) -> u32 {
    let mut total: u32 = NAME_FIELDS
        .iter()
        .filter_map(|field| {
            non_blank((field.value)(entry))
                .map(|v| field.weights.score(&normalize(v), key))
        })
        .sum();

    for synonym in &entry.synonyms {
        let synonym = normalize(synonym);
        if synonym.is_empty() {
            continue;
        }
        if synonym == key {
            total += SYNONYM_EXACT;
        } else if synonym.starts_with(key) {
            total += SYNONYM_PREFIX;
        }
    }

    if non_blank(entry.description.as_deref())
        .is_some_and(|d| normalize(d).contains(key))
    {
        total += DESCRIPTION_CONTAINS;
    }

    if total < FUZZY_THRESHOLD {
        let budget = fuzzy_budget(key.chars().count());
        if budget > 0
            && let Some(distance) = bounded_levenshtein(
                &normalize(&entry.korean_name),
                key,
                budget,
            )
        {
            total += FUZZY_BASE - FUZZY_STEP * distance as u32;
        }
    }

    if total == 0 {
        return 0;
    }
    total + kind_bonus(entry.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(ko: &str, abbr: &str) -> DictionaryEntry {
        DictionaryEntry::new(EntryKind::Word, ko).with_abbreviation(abbr)
    }

    #[test]
    fn name_tiers_descend() {
        for field in NAME_FIELDS {
            let w = field.weights;
            assert!(w.exact > w.prefix, "{}", field.name);
            assert!(w.prefix > w.contains, "{}", field.name);
        }
        for pair in NAME_FIELDS.windows(2) {
            assert!(pair[0].weights.exact > pair[1].weights.exact);
        }
    }

    #[test]
    fn exact_abbreviation_beats_prefix_and_contains() {
        let exact = score(&word("정확", "API_NM"), "apinm");
        let prefix = score(&word("접두", "API_NM_CD"), "apinm");
        let contains = score(&word("포함", "MY_API_NM"), "apinm");

        assert_eq!(exact, 1900 + 20);
        assert_eq!(prefix, 750 + 20);
        assert_eq!(contains, 380 + 20);
    }

    #[test]
    fn fields_accumulate() {
        let e = DictionaryEntry::new(EntryKind::Term, "api")
            .with_abbreviation("API")
            .with_english_name("api")
            .with_description("the api");
        assert_eq!(score(&e, "api"), 2000 + 1900 + 1800 + 50 + 30);
    }

    #[test]
    fn synonym_bonuses() {
        let e = word("단어", "ABC_DEF").with_synonyms(["테스트", "테스"]);
        assert_eq!(score(&e, "테스"), SYNONYM_EXACT + SYNONYM_PREFIX + 20);
    }

    #[test]
    fn fuzzy_korean_name_within_budget() {
        let e = word("학교", "SCHOOL");
        assert_eq!(score(&e, "학꾜"), FUZZY_BASE - FUZZY_STEP + 20);
    }

    #[test]
    fn fuzzy_skipped_for_strong_matches() {
        // "abcd" is a substring of the korean name (400), so the fuzzy
        // tier must not add to it.
        let e = DictionaryEntry::new(EntryKind::Word, "xabcd");
        assert_eq!(score(&e, "abcd"), 400 + 20);
    }

    #[test]
    fn short_keys_get_no_fuzzy_budget() {
        assert_eq!(fuzzy_budget(1), 0);
        assert_eq!(fuzzy_budget(3), 1);
        assert_eq!(fuzzy_budget(10), 2);

        let e = word("가", "ZZ");
        assert_eq!(score(&e, "나"), 0);
    }

    #[test]
    fn unrelated_entry_scores_zero() {
        let e = word("학교", "SCHOOL").with_description("교육 기관");
        assert_eq!(score(&e, "zzzz"), 0);
    }

    #[test]
    fn kind_bonus_orders_kinds() {
        assert!(kind_bonus(EntryKind::Term) > kind_bonus(EntryKind::Word));
        assert!(kind_bonus(EntryKind::Word) > kind_bonus(EntryKind::Domain));
    }
}
