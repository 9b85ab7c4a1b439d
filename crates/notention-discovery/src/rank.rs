//! Orders the candidates a collection window caught.

use crate::query::{Criterion, DiscoveryQuery};
use notention_engine::{NoteId, NoteRecord, PublisherId};

/// One ranked provider note. Immutable once the session is finalized.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub note_id: NoteId,
    pub publisher: PublisherId,
    pub title: String,
    /// The criteria this note satisfied.
    pub matched: Vec<Criterion>,
    /// Number of satisfied criteria.
    pub score: usize,
    pub published_at: u64,
}

/// Scores and orders candidates against the query: score descending, ties
/// broken by most recent publication. An empty list is a normal terminal
/// state, distinct from a dispatch failure.
pub fn rank(candidates: &[NoteRecord], query: &DiscoveryQuery) -> Vec<MatchResult> {
    let mut results: Vec<MatchResult> = candidates
        .iter()
        .filter_map(|candidate| {
            let matched: Vec<Criterion> = query
                .satisfied(&candidate.properties)
                .into_iter()
                .cloned()
                .collect();
            if matched.is_empty() {
                return None;
            }
            Some(MatchResult {
                note_id: candidate.note_id,
                publisher: candidate.publisher.clone(),
                title: candidate.title.clone(),
                score: matched.len(),
                matched,
                published_at: candidate.published_at,
            })
        })
        .collect();

    results.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.published_at.cmp(&a.published_at))
    });
    results
}
