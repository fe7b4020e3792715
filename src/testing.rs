//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.
//! It provides canonical implementations of test helpers to avoid
//! duplication.

#![doc(hidden)]

use crate::index::PrefixIndex;
use crate::store::{build_blocks, BlockCache, MemStore, StoreConfig};
use crate::types::ChatMessage;

/// Create a test message with a zero timestamp.
pub fn make_message(user: &str, body: &str) -> ChatMessage {
    ChatMessage {
        timestamp: 0,
        user: user.to_string(),
        body: body.to_string(),
    }
}

/// Create a test message with an explicit timestamp.
pub fn make_message_at(timestamp: i64, user: &str, body: &str) -> ChatMessage {
    ChatMessage {
        timestamp,
        user: user.to_string(),
        body: body.to_string(),
    }
}

/// Build an in-memory engine (index + cache) over the given bodies,
/// one message per body, all from user "user".
pub fn build_mem_engine(
    bodies: &[&str],
    block_size: usize,
) -> (PrefixIndex, BlockCache<MemStore>) {
    let messages: Vec<ChatMessage> = bodies.iter().map(|b| make_message("user", b)).collect();
    build_mem_engine_from(&messages, block_size)
}

/// Build an in-memory engine from explicit messages.
pub fn build_mem_engine_from(
    messages: &[ChatMessage],
    block_size: usize,
) -> (PrefixIndex, BlockCache<MemStore>) {
    let mut store = MemStore::new();
    let index = build_blocks(messages, &StoreConfig { block_size }, &mut store)
        .expect("in-memory build cannot fail");
    (index, BlockCache::new(store))
}
