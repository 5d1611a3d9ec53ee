//! Context assembly — select a bounded subset of the knowledge base.
//!
//! Given the query and the full ordered entry list, a selection policy
//! picks the entries worth sending, and a token budget caps how much of
//! them fits in the window. Assembly is deterministic for a fixed knowledge
//! base and query.

use tracing::debug;

use vademecum_config::RetrievalConfig;
use vademecum_core::knowledge::KnowledgeEntry;

use crate::similarity;

/// Visible separator between entries in the assembled window.
pub const CONTEXT_SEPARATOR: &str = "\n---\n";

/// How entries are selected for the context window.
///
/// Listed in increasing precision, decreasing recall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Send every entry.
    All,
    /// Keep entries sharing at least one query token; fall back to the most
    /// recent `fallback_recent` entries when nothing matches.
    Keyword { fallback_recent: usize },
    /// Keep the `top_k` entries ranked by embedding similarity.
    Similarity { top_k: usize },
}

/// Assembles the context window for one query.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    policy: SelectionPolicy,
    max_context_tokens: usize,
}

impl ContextAssembler {
    pub fn new(policy: SelectionPolicy, max_context_tokens: usize) -> Self {
        Self {
            policy,
            max_context_tokens,
        }
    }

    /// Build an assembler from the retrieval configuration section.
    ///
    /// The policy string was validated at config load; an unknown value
    /// still degrades safely to `All` rather than panicking.
    pub fn from_config(config: &RetrievalConfig) -> Self {
        let policy = match config.policy.as_str() {
            "keyword" => SelectionPolicy::Keyword {
                fallback_recent: config.fallback_recent,
            },
            "similarity" => SelectionPolicy::Similarity {
                top_k: config.top_k,
            },
            _ => SelectionPolicy::All,
        };
        Self::new(policy, config.max_context_tokens)
    }

    /// Select and join entries into a single context string.
    ///
    /// Returns the empty string when the knowledge base is empty or nothing
    /// survives selection — the caller must then short-circuit to the
    /// canonical refusal without invoking the generator.
    pub fn assemble(&self, query: &str, entries: &[KnowledgeEntry]) -> String {
        if entries.is_empty() {
            return String::new();
        }

        let selected: Vec<&KnowledgeEntry> = match &self.policy {
            SelectionPolicy::All => entries.iter().collect(),
            SelectionPolicy::Keyword { fallback_recent } => {
                self.select_by_keyword(query, entries, *fallback_recent)
            }
            SelectionPolicy::Similarity { top_k } => {
                similarity::rank_entries(entries, query, *top_k)
            }
        };

        let budgeted = self.apply_budget(&selected);

        debug!(
            total = entries.len(),
            selected = selected.len(),
            kept = budgeted.len(),
            "Context assembled"
        );

        budgeted
            .iter()
            .map(|e| e.content.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    /// Entries containing at least one query token as a case-insensitive
    /// substring. Tokens shorter than 3 characters are skipped so articles
    /// do not match every entry.
    fn select_by_keyword<'a>(
        &self,
        query: &str,
        entries: &'a [KnowledgeEntry],
        fallback_recent: usize,
    ) -> Vec<&'a KnowledgeEntry> {
        let tokens = similarity::tokenize(query, 3);

        let matched: Vec<&KnowledgeEntry> = entries
            .iter()
            .filter(|entry| {
                let content = entry.content.to_lowercase();
                tokens.iter().any(|token| content.contains(token.as_str()))
            })
            .collect();

        if !matched.is_empty() {
            return matched;
        }

        // No token overlap: fall back to the tail of the insertion order.
        entries
            .iter()
            .rev()
            .take(fallback_recent)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect()
    }

    /// Keep selected entries, in policy order, until the token budget is
    /// exhausted. The first entry is always kept so selection never turns a
    /// non-empty choice into an empty window.
    fn apply_budget<'a>(&self, selected: &[&'a KnowledgeEntry]) -> Vec<&'a KnowledgeEntry> {
        let mut kept = Vec::new();
        let mut used = 0usize;

        for entry in selected {
            let cost = estimate_tokens(&entry.content);
            if !kept.is_empty() && used + cost > self.max_context_tokens {
                break;
            }
            used += cost;
            kept.push(*entry);
        }
        kept
    }
}

/// Estimate the token count for a string.
///
/// Heuristic: 1 token ≈ 4 characters. Rounds up.
pub fn estimate_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    text.len().div_ceil(4)
}
