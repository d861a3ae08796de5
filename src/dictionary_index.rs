use std::collections::{BTreeMap, HashSet, VecDeque};

use tracing::debug;

use crate::{
    entry::{DictionaryEntry, EntryKind},
    scoring,
    text_util::normalize,
};

/// Trie collection keeps this many candidates per requested result, so
/// re-ranking has room to reorder.
pub const CANDIDATE_OVERSAMPLE: usize = 8;

/// Floor for the trie candidate budget.
pub const MIN_CANDIDATES: usize = 64;

/// Text plus optional exact-match filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    pub kind: Option<EntryKind>,
    pub domain_group: Option<String>,
    pub domain_category: Option<String>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_domain_group(mut self, group: impl Into<String>) -> Self {
        self.domain_group = Some(group.into());
        self
    }

    pub fn with_domain_category(mut self, category: impl Into<String>) -> Self {
        self.domain_category = Some(category.into());
        self
    }

    /// Whether `entry` passes every filter that is set.
    pub fn accepts(&self, entry: &DictionaryEntry) -> bool {
        self.kind.is_none_or(|kind| entry.kind == kind)
            && self
                .domain_group
                .as_ref()
                .is_none_or(|g| entry.domain_group.as_ref() == Some(g))
            && self
                .domain_category
                .as_ref()
                .is_none_or(|c| entry.domain_category.as_ref() == Some(c))
    }
}

/// One search hit, borrowed from the index it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranked<'a> {
    pub entry: &'a DictionaryEntry,
    pub score: u32,
}

/// Entries hang off the node where one of their normalized tokens ends,
/// ascending and deduplicated, split by whether the token is a name.
#[derive(Debug, Default)]
struct TrieNode {
    children: BTreeMap<char, usize>,
    names: Vec<usize>,
    /// Description and synonym tokens.
    others: Vec<usize>,
}

impl TrieNode {
    fn names(&self) -> &[usize] {
        &self.names
    }

    fn others(&self) -> &[usize] {
        &self.others
    }
}

/// Immutable prefix index over an effective entry set.
///
/// Entries live in one arena and trie nodes refer to them by position, so
/// the index owns each entry exactly once. There is no mutation API: when
/// the entry set changes, build a new index and swap it in.
#[derive(Debug)]
pub struct DictionaryIndex {
    entries: Vec<DictionaryEntry>,
    nodes: Vec<TrieNode>,
}

impl DictionaryIndex {
    /// Index every token of every entry.
    ///
    /// Cost is linear in the total normalized token length.
    pub fn build(entries: Vec<DictionaryEntry>) -> Self {
        let mut nodes = vec![TrieNode::default()];

        for (id, entry) in entries.iter().enumerate() {
            let names = entry.name_tokens();
            for token in entry.all_tokens() {
                let key = normalize(&token);
                if key.is_empty() {
                    continue;
                }
                let mut node = 0;
                for c in key.chars() {
                    node = match nodes[node].children.get(&c) {
                        Some(&child) => child,
                        None => {
                            let child = nodes.len();
                            nodes.push(TrieNode::default());
                            nodes[node].children.insert(c, child);
                            child
                        }
                    };
                }
                let terminal = if names.contains(&token) {
                    &mut nodes[node].names
                } else {
                    &mut nodes[node].others
                };
                if terminal.last() != Some(&id) {
                    terminal.push(id);
                }
            }
        }

        debug!(entries = entries.len(), nodes = nodes.len(), "built index");
        Self { entries, nodes }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    /// Ranked lookup of `query`, at most `limit` hits.
    ///
    /// A blank query lists entries passing the filters with score 0, in
    /// index order. Otherwise candidates come from the trie node at the
    /// normalized query; if no token has that prefix, every entry passing
    /// the filters is a candidate so the fuzzy tier can still find near
    /// misses. Candidates are scored, zero scores dropped, and the rest
    /// sorted by score with index order breaking ties.
    pub fn search(&self, query: &Query, limit: usize) -> Vec<Ranked<'_>> {
        if limit == 0 {
            return Vec::new();
        }

        let key = normalize(&query.text);
        if key.is_empty() {
            return self
                .entries
                .iter()
                .filter(|e| query.accepts(e))
                .take(limit)
                .map(|entry| Ranked { entry, score: 0 })
                .collect();
        }

        let candidates = match self.find_node(&key) {
            Some(node) => self.collect_candidates(
                node,
                query,
                limit
                    .saturating_mul(CANDIDATE_OVERSAMPLE)
                    .max(MIN_CANDIDATES),
            ),
            None => {
                debug!(key = %key, "no trie path, scanning all entries");
                (0..self.entries.len())
                    .filter(|&id| query.accepts(&self.entries[id]))
                    .collect()
            }
        };

        let mut scored: Vec<(usize, u32)> = candidates
            .into_iter()
            .map(|id| (id, scoring::score(&self.entries[id], &key)))
            .filter(|&(_, score)| score > 0)
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(id, score)| Ranked {
                entry: &self.entries[id],
                score,
            })
            .collect()
    }

    fn find_node(&self, key: &str) -> Option<usize> {
        key.chars().try_fold(0, |node, c| {
            self.nodes[node].children.get(&c).copied()
        })
    }

    /// Entries at or below `start` that pass the filters, up to `budget`.
    ///
    /// Name tokens are walked before description and synonym tokens, and
    /// each walk visits shallower nodes first. A name prefix hit outscores
    /// any description or synonym hit, so those tokens can never crowd a
    /// name hit out of the budget.
    fn collect_candidates(
        &self,
        start: usize,
        query: &Query,
        budget: usize,
    ) -> Vec<usize> {
        let tiers: [fn(&TrieNode) -> &[usize]; 2] =
            [TrieNode::names, TrieNode::others];

        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for tier in tiers {
            let mut frontier = VecDeque::from([start]);
            while let Some(node) = frontier.pop_front() {
                let node = &self.nodes[node];
                for &id in tier(node) {
                    if query.accepts(&self.entries[id]) && seen.insert(id) {
                        out.push(id);
                        if out.len() >= budget {
                            return out;
                        }
                    }
                }
                frontier.extend(node.children.values().copied());
            }
        }

        out
    }
}
