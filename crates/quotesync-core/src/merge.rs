//! Merge of remote and local collections
//!
//! Quotes are keyed by exact text. On a collision the remote quote wins,
//! including its category. Remote quotes come first in remote order; quotes
//! only known locally follow in local order.

use std::collections::HashSet;

use crate::models::Collection;

/// Counts describing one merge, for logging and reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Quotes taken from the remote side
    pub from_remote: usize,
    /// Local quotes kept because the remote lacks their text
    pub from_local: usize,
    /// Local quotes dropped in favor of the remote version
    pub discarded_local: usize,
}

/// Reconcile `remote` and `local` into one collection, remote wins on collision
pub fn merge(remote: &Collection, local: &Collection) -> Collection {
    merge_with_stats(remote, local).0
}

/// [`merge`] plus counts of where each quote came from
pub fn merge_with_stats(remote: &Collection, local: &Collection) -> (Collection, MergeStats) {
    let mut stats = MergeStats::default();
    let mut seen: HashSet<&str> = HashSet::with_capacity(remote.len() + local.len());
    let mut result = Collection::new();

    for quote in remote {
        if seen.insert(quote.text.as_str()) {
            result.push(quote.clone());
            stats.from_remote += 1;
        }
    }

    for quote in local {
        if seen.insert(quote.text.as_str()) {
            result.push(quote.clone());
            stats.from_local += 1;
        } else {
            stats.discarded_local += 1;
        }
    }

    (result, stats)
}

/// Local quotes whose text the remote does not have, in local order
pub fn local_only(remote: &Collection, local: &Collection) -> Collection {
    let remote_texts = remote.texts();
    local
        .iter()
        .filter(|q| !remote_texts.contains(q.text.as_str()))
        .cloned()
        .collect()
}
