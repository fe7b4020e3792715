//! Offline fuzzy search over block-compressed chat logs.
//!
//! The log is partitioned into brotli-compressed blocks of up to 100
//! messages, a coarse inverted index over 4-character word prefixes is
//! built in the same pass, and free-text queries intersect index candidates
//! before re-ranking them with fuzzy word matching.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ ingest.rs  │────▶│  store.rs   │────▶│  search.rs  │
//! │ (parse_log)│     │(build_blocks│     │  (search)   │
//! │            │     │ BlockCache) │     │             │
//! └────────────┘     └─────────────┘     └─────────────┘
//!                           │                   │
//!                           ▼                   ▼
//!                    ┌─────────────┐     ┌─────────────┐
//!                    │  block.rs   │     │  index.rs + │
//!                    │ (frame +    │     │ intersect + │
//!                    │  brotli)    │     │    fuzzy    │
//!                    └─────────────┘     └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use logsieve::{build_blocks, parse_log, search, BlockCache, MemStore, StoreConfig};
//!
//! let messages = parse_log(&raw_log)?;
//! let mut store = MemStore::new();
//! let index = build_blocks(&messages, &StoreConfig::default(), &mut store)?;
//! let cache = BlockCache::new(store);
//!
//! let outcome = search(&index, &cache, "trying upload")?;
//! ```
//!
//! The index is an explicit immutable value: build it once, keep it
//! wherever you like, and pass it by reference into every query. Blocks
//! and index must come from the same `build_blocks` pass.

// Module declarations
pub mod block;
mod error;
mod fuzzy;
mod index;
mod ingest;
mod intersect;
mod search;
mod store;
pub mod testing;
mod tokenize;
mod types;

// Re-exports for public API
pub use error::{Error, Result};
pub use fuzzy::{best_match, levenshtein, similarity};
pub use index::PrefixIndex;
pub use ingest::{parse_log, SERVER_USER};
pub use intersect::intersect_all;
pub use search::search;
#[cfg(feature = "parallel")]
pub use search::search_parallel;
pub use store::{
    build_blocks, BlockCache, BlockSink, BlockSource, DirStore, MemStore, StoreConfig,
};
#[cfg(feature = "parallel")]
pub use store::build_blocks_parallel;
pub use tokenize::{prefix_key, to_words, PREFIX_LEN};
pub use types::{
    BlockId, ChatMessage, Location, MatchScore, SearchOutcome, SearchResult, SearchStats,
};
