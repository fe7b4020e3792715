//! Query execution: candidate generation, fuzzy scoring, excerpts.
//!
//! A query runs in three stages. Candidate generation tokenizes the query
//! and intersects the per-word index lookups - no block is touched yet.
//! Scoring resolves each surviving location through the block cache and
//! fuzzy-matches every query word against the candidate's body. Accepted
//! candidates are excerpted around the mean match position.
//!
//! Results come out in candidate-set order, (block, offset) ascending.
//! No further ranking is applied.

use std::collections::BTreeSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::Result;
use crate::fuzzy::best_match;
use crate::index::PrefixIndex;
use crate::intersect::intersect_all;
use crate::store::{BlockCache, BlockSource};
use crate::tokenize::{prefix_key, to_words};
use crate::types::{ChatMessage, Location, SearchOutcome, SearchResult, SearchStats};

/// Run one query against a built index and its block cache.
///
/// A query with zero tokenizable words, or any word whose prefix never
/// occurred, yields zero results and touches no block. A block that cannot
/// be fetched or decoded aborts the query with the error.
pub fn search<S: BlockSource>(
    index: &PrefixIndex,
    cache: &BlockCache<S>,
    query: &str,
) -> Result<SearchOutcome> {
    let words = to_words(query);
    if words.is_empty() {
        return Ok(SearchOutcome::default());
    }

    let sets: Vec<&BTreeSet<Location>> =
        words.iter().map(|w| index.lookup(&prefix_key(w))).collect();
    let candidates = intersect_all(&sets);

    let before = cache.decompressions();
    let mut results = Vec::new();
    for loc in &candidates {
        let message = cache.message(*loc)?;
        if let Some(result) = score_candidate(&message, &words) {
            results.push(result);
        }
    }

    Ok(SearchOutcome {
        stats: SearchStats {
            candidates: candidates.len(),
            blocks_decompressed: cache.decompressions() - before,
        },
        results,
    })
}

/// Parallel variant: candidates are scored on the rayon pool against the
/// shared cache. Result order is identical to the sequential path.
#[cfg(feature = "parallel")]
pub fn search_parallel<S: BlockSource + Sync>(
    index: &PrefixIndex,
    cache: &BlockCache<S>,
    query: &str,
) -> Result<SearchOutcome> {
    let words = to_words(query);
    if words.is_empty() {
        return Ok(SearchOutcome::default());
    }

    let sets: Vec<&BTreeSet<Location>> =
        words.iter().map(|w| index.lookup(&prefix_key(w))).collect();
    let candidates = intersect_all(&sets);
    let locs: Vec<Location> = candidates.iter().copied().collect();

    let before = cache.decompressions();
    let scored: Vec<Option<SearchResult>> = locs
        .par_iter()
        .map(|loc| {
            let message = cache.message(*loc)?;
            Ok(score_candidate(&message, &words))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SearchOutcome {
        stats: SearchStats {
            candidates: locs.len(),
            blocks_decompressed: cache.decompressions() - before,
        },
        results: scored.into_iter().flatten().collect(),
    })
}

/// Score one candidate against the query words; `Some` iff accepted.
fn score_candidate(message: &ChatMessage, query_words: &[String]) -> Option<SearchResult> {
    let body_words = to_words(&message.body);

    let mut matches = Vec::with_capacity(query_words.len());
    for word in query_words {
        matches.push(best_match(&body_words, word)?);
    }

    let n = matches.len() as f64;
    let mean_pos = matches.iter().map(|m| m.position as f64).sum::<f64>() / n;
    let mean_score = matches.iter().map(|m| m.score).sum::<f64>() / n;
    let variance = matches
        .iter()
        .map(|m| (m.position as f64 - mean_pos).powi(2))
        .sum::<f64>()
        / n;
    let spread = variance.sqrt();

    // `spread` penalizes query words whose best matches sit far apart in the
    // body. `mean_score` is a similarity, and it lands on the SAME side of
    // the comparison as the penalty, so the gate filters almost entirely on
    // positional spread. The polarity is load-bearing: flipping it changes
    // which candidates survive. Keep the comparison as written.
    if spread / 3.0 + mean_score >= 2.0 {
        return None;
    }

    Some(SearchResult {
        timestamp: message.timestamp,
        user: message.user.clone(),
        excerpt: excerpt(&message.body, mean_pos, query_words.len()),
    })
}

/// Excerpt window: whitespace-split body words around the mean match
/// position, `query_len + 4` on each side, float bounds truncated and the
/// end clamped by slicing.
fn excerpt(body: &str, mean_pos: f64, query_len: usize) -> String {
    let words: Vec<&str> = body.split_whitespace().collect();
    let margin = (query_len + 4) as f64;
    let end = ((mean_pos + margin) as usize).min(words.len());
    let start = ((mean_pos - margin).max(0.0) as usize).min(end);
    words[start..end].join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::build_mem_engine as engine;

    #[test]
    fn test_empty_query_yields_nothing() {
        let (index, cache) = engine(&["hello world"], 100);
        let outcome = search(&index, &cache, "").unwrap();
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.stats, SearchStats::default());
    }

    #[test]
    fn test_unknown_prefix_touches_no_block() {
        let (index, cache) = engine(&["hello world"], 100);
        let outcome = search(&index, &cache, "zzzzzz").unwrap();
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.stats.candidates, 0);
        assert_eq!(outcome.stats.blocks_decompressed, 0);
        assert_eq!(cache.decompressions(), 0);
    }

    #[test]
    fn test_single_word_match() {
        let (index, cache) = engine(&["trying to upload a file now", "ok thanks"], 100);
        let outcome = search(&index, &cache, "upload").unwrap();
        assert_eq!(outcome.results.len(), 1);
        assert!(outcome.results[0].excerpt.contains("upload"));
    }

    #[test]
    fn test_word_stripped_to_empty_kills_the_query() {
        // "---" tokenizes to the empty word, whose key no message carries
        let (index, cache) = engine(&["trying to upload a file now"], 100);
        let outcome = search(&index, &cache, "upload ---").unwrap();
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.stats.candidates, 0);
    }

    #[test]
    fn test_excerpt_window_bounds() {
        let body: Vec<String> = (0..40).map(|i| format!("w{}", i)).collect();
        let body = body.join(" ");
        // mean position 20, one query word: window is [15, 25)
        let e = excerpt(&body, 20.0, 1);
        let words: Vec<&str> = e.split(' ').collect();
        assert_eq!(words.first(), Some(&"w15"));
        assert_eq!(words.last(), Some(&"w24"));
    }

    #[test]
    fn test_excerpt_clamps_at_the_edges() {
        let e = excerpt("a b c", 1.0, 2);
        assert_eq!(e, "a b c");
    }

    #[test]
    fn test_scattered_matches_are_rejected() {
        // Two query words whose best matches are ~40 positions apart:
        // spread/3 alone exceeds the gate.
        let mut words: Vec<String> = (0..40).map(|i| format!("filler{}", i)).collect();
        words.insert(0, "alpha".to_string());
        words.push("omega".to_string());
        let body = words.join(" ");
        let (index, cache) = engine(&[&body], 100);
        let outcome = search(&index, &cache, "alpha omega").unwrap();
        assert_eq!(outcome.stats.candidates, 1);
        assert!(outcome.results.is_empty());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let bodies: Vec<String> = (0..50)
            .map(|i| format!("message {} trying upload attempt {}", i, i))
            .collect();
        let refs: Vec<&str> = bodies.iter().map(String::as_str).collect();
        let (index, cache) = engine(&refs, 10);
        let seq = search(&index, &cache, "trying upload").unwrap();
        let par = search_parallel(&index, &cache, "trying upload").unwrap();
        assert_eq!(seq.results, par.results);
        assert_eq!(seq.stats.candidates, par.stats.candidates);
    }
}
