//! Shared test utilities and fixtures.

#![allow(dead_code)]

use logsieve::{
    build_blocks, parse_log, BlockCache, ChatMessage, DirStore, MemStore, PrefixIndex,
    StoreConfig,
};

// Re-export canonical test utilities from logsieve::testing
pub use logsieve::testing::{build_mem_engine, build_mem_engine_from, make_message};

/// A small two-user log matching the canonical scenario.
pub const SAMPLE_LOG: &str = "\
2023-01-01
[00:00:05] <alice> trying to upload a file now
[00:00:10] <bob> ok thanks
";

/// A longer synthetic log: one day line, then `n` messages five seconds
/// apart, cycling through three users.
pub fn synthetic_log(n: usize) -> String {
    let mut log = String::from("2023-06-15\n");
    let users = ["alice", "bob", "carol"];
    for i in 0..n {
        let secs = i * 5;
        log.push_str(&format!(
            "[{:02}:{:02}:{:02}] <{}> message number {} about topic {}\n",
            secs / 3600,
            (secs / 60) % 60,
            secs % 60,
            users[i % users.len()],
            i,
            i % 7,
        ));
    }
    log
}

/// Parse a log and build an in-memory engine over it.
pub fn engine_from_log(
    log: &str,
    block_size: usize,
) -> (Vec<ChatMessage>, PrefixIndex, BlockCache<MemStore>) {
    let messages = parse_log(log).expect("fixture log parses");
    let (index, cache) = build_mem_engine_from(&messages, block_size);
    (messages, index, cache)
}

/// Build blocks into a fresh temporary directory, returning the TempDir
/// (to keep it alive), the index, and a cache over the directory store.
pub fn engine_in_tempdir(
    messages: &[ChatMessage],
    block_size: usize,
) -> (tempfile::TempDir, PrefixIndex, BlockCache<DirStore>) {
    let dir = tempfile::TempDir::new().expect("create temp directory");
    let mut store = DirStore::create(dir.path()).expect("create block directory");
    let index = build_blocks(messages, &StoreConfig { block_size }, &mut store)
        .expect("build should succeed");
    (dir, index, BlockCache::new(store))
}
