use std::fmt::Write as _;

use serde::Serialize;

use crate::{
    dictionary_index::Query,
    entry::{DictionaryEntry, EntryKind},
    error::Result,
    service::DictionaryService,
};

#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub query: String,
    /// Falls back to the configured result limit when unset.
    pub count: Option<usize>,
    pub kind: Option<EntryKind>,
    pub domain_group: Option<String>,
    pub domain_category: Option<String>,
}

impl SearchParams {
    pub fn to_query(&self) -> Query {
        let mut query = Query::new(self.query.as_str());
        if let Some(kind) = self.kind {
            query = query.with_kind(kind);
        }
        if let Some(group) = &self.domain_group {
            query = query.with_domain_group(group.as_str());
        }
        if let Some(category) = &self.domain_category {
            query = query.with_domain_category(category.as_str());
        }
        query
    }
}

/// A ranked search result as presented to the user.
#[derive(Debug, Clone, Serialize)]
pub struct FinalResult {
    pub rank: usize,
    pub score: u32,
    pub key: String,
    pub entry: DictionaryEntry,
}

/// Run a search against the published index.
pub fn execute_search(
    params: &SearchParams,
    service: &DictionaryService,
) -> Result<Vec<FinalResult>> {
    let limit = match params.count {
        Some(count) => count,
        None => service.config()?.result_limit,
    };

    let results = service
        .search(&params.to_query(), limit)
        .into_iter()
        .enumerate()
        .map(|(i, hit)| FinalResult {
            rank: i + 1,
            score: hit.score,
            key: hit.entry.stable_key(),
            entry: hit.entry,
        })
        .collect();

    Ok(results)
}

/// Render results for a terminal.
pub fn format_human(results: &[FinalResult]) -> String {
    if results.is_empty() {
        return "No results found.\n".to_string();
    }

    let mut out = String::new();
    for r in results {
        let e = &r.entry;
        let _ = write!(
            out,
            "{:>3}. [{}] {} {}",
            r.rank, r.score, e.kind, e.korean_name
        );
        if let Some(abbr) = e.english_abbreviation.as_deref() {
            let _ = write!(out, " ({abbr})");
        }
        if let Some(name) = e.english_name.as_deref() {
            let _ = write!(out, " {name}");
        }
        out.push('\n');
        if let Some(description) = e.description.as_deref() {
            let _ = writeln!(out, "     {description}");
        }
    }
    let _ = writeln!(out, "\n{} result(s)", results.len());
    out
}

pub fn format_json(results: &[FinalResult], query: &str) -> Result<String> {
    Ok(serde_json::to_string(&serde_json::json!({
        "query": query,
        "result_count": results.len(),
        "results": results,
    }))?)
}
