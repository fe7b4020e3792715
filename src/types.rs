// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The building blocks of the log search engine.
//!
//! These types define how messages, blocks, and match results fit together.
//!
//! # Invariants (the stuff that breaks if you ignore it)
//!
//! - **BlockId**: dense and contiguous from 0, assigned in emission order.
//!   A message belongs to exactly one block.
//!
//! - **Location**: `offset < block.len()` for the block it names. The index
//!   and the block store must be built from the same message sequence;
//!   querying a mismatched pair produces garbage, not errors.
//!
//! - **PrefixIndex / BlockCache**: read-only for the lifetime of all queries
//!   in a run. Nothing mutates a block after it is written.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// NEWTYPES: Type-safe block identifiers
// =============================================================================

/// Type-safe block identifier.
///
/// Prevents accidentally passing a message offset where a block id is
/// expected. Ids are assigned densely from 0 in partition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct BlockId(pub u32);

impl BlockId {
    /// Get the underlying value.
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Convert to usize for array indexing.
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for BlockId {
    fn from(id: u32) -> Self {
        BlockId(id)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// MESSAGE TYPES
// =============================================================================

/// One chat message, as produced by ingestion.
///
/// `timestamp` is seconds: the most recent day line's midnight plus the
/// message's time-of-day offset. Immutable once created; ownership moves to
/// the block store at build time in log order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub timestamp: i64,
    pub user: String,
    pub body: String,
}

/// Handle identifying one message: which block, and where inside it.
///
/// This is the value the index stores and the cache resolves. Ordered by
/// (block, offset), which is also the order results are emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub block: BlockId,
    pub offset: u32,
}

impl Location {
    #[inline]
    pub fn new(block: BlockId, offset: u32) -> Self {
        Self { block, offset }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block, self.offset)
    }
}

// =============================================================================
// MATCH TYPES
// =============================================================================

/// Best fuzzy match for one query word within one candidate body.
///
/// `position` is the index of the best-matching word in the candidate's
/// tokenized body; `score` is the raw similarity of that match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScore {
    pub score: f64,
    pub position: usize,
}

/// An accepted candidate: the message with its body replaced by the excerpt
/// window centered on the match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub timestamp: i64,
    pub user: String,
    pub excerpt: String,
}

/// Observability counters for one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Candidates surviving index intersection and examined by the scorer.
    pub candidates: usize,
    /// Distinct blocks actually decompressed while resolving candidates.
    pub blocks_decompressed: usize,
}

/// Results plus counters for one query.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub stats: SearchStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_orders_by_block_then_offset() {
        let a = Location::new(BlockId(0), 5);
        let b = Location::new(BlockId(1), 0);
        let c = Location::new(BlockId(1), 3);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn location_display() {
        assert_eq!(Location::new(BlockId(7), 42).to_string(), "7:42");
    }

    #[test]
    fn chat_message_json_roundtrip() {
        let msg = ChatMessage {
            timestamp: 1672531205,
            user: "alice".to_string(),
            body: "trying to upload a file now".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }
}
