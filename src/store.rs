// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Block storage: build-time partitioning and query-time cached reads.
//!
//! Persistence hides behind two capability traits so the engine never
//! touches the filesystem directly: `BlockSink` on the build side,
//! `BlockSource` on the query side. `DirStore` implements both over a
//! directory of `<id>.blk` files; `MemStore` is the in-memory fake the
//! tests run against.
//!
//! `build_blocks` is the one pass that does everything: partition the
//! message sequence into blocks, index each block's bodies, compress and
//! persist each block. Index and artifacts always come from the same pass,
//! so they cannot drift.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

#[cfg(feature = "parallel")]
use indicatif::ProgressBar;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::block::{decompress_and_parse, serialize_and_compress, DEFAULT_BLOCK_SIZE};
use crate::error::{Error, Result};
use crate::index::PrefixIndex;
use crate::tokenize::{prefix_key, to_words};
use crate::types::{BlockId, ChatMessage, Location};

// ============================================================================
// CONFIG
// ============================================================================

/// Build-time knobs.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum messages per block. The last block may be short.
    pub block_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

// ============================================================================
// CAPABILITY TRAITS
// ============================================================================

/// Build-side capability: persist one block artifact under its id.
pub trait BlockSink {
    fn put(&mut self, id: BlockId, bytes: &[u8]) -> Result<()>;
}

/// Query-side capability: fetch one block artifact's bytes by id.
///
/// Failing to find or read the artifact is `Error::Storage` - fatal to the
/// query resolving that block.
pub trait BlockSource {
    fn fetch(&self, id: BlockId) -> Result<Vec<u8>>;
}

// ============================================================================
// DIRECTORY STORE
// ============================================================================

/// One `<id>.blk` file per block under a directory.
#[derive(Debug)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Open (creating if needed) a block directory.
    pub fn create(dir: impl AsRef<Path>) -> io::Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    /// Open an existing block directory without touching it.
    pub fn open(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the artifact for `id`.
    pub fn path(&self, id: BlockId) -> PathBuf {
        self.dir.join(format!("{}.blk", id))
    }
}

impl BlockSink for DirStore {
    fn put(&mut self, id: BlockId, bytes: &[u8]) -> Result<()> {
        fs::write(self.path(id), bytes).map_err(|source| Error::Storage { block: id, source })
    }
}

impl BlockSource for DirStore {
    fn fetch(&self, id: BlockId) -> Result<Vec<u8>> {
        fs::read(self.path(id)).map_err(|source| Error::Storage { block: id, source })
    }
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// In-memory block store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemStore {
    blocks: HashMap<BlockId, Vec<u8>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop one artifact, simulating a missing block.
    pub fn remove(&mut self, id: BlockId) -> Option<Vec<u8>> {
        self.blocks.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl BlockSink for MemStore {
    fn put(&mut self, id: BlockId, bytes: &[u8]) -> Result<()> {
        self.blocks.insert(id, bytes.to_vec());
        Ok(())
    }
}

impl BlockSource for MemStore {
    fn fetch(&self, id: BlockId) -> Result<Vec<u8>> {
        self.blocks.get(&id).cloned().ok_or_else(|| Error::Storage {
            block: id,
            source: io::Error::new(io::ErrorKind::NotFound, "no artifact for block"),
        })
    }
}

// ============================================================================
// BUILD
// ============================================================================

/// Index every nonempty word of one block's messages.
fn index_block(index: &mut PrefixIndex, id: BlockId, chunk: &[ChatMessage]) {
    for (offset, message) in chunk.iter().enumerate() {
        for word in to_words(&message.body) {
            if word.is_empty() {
                continue;
            }
            index.add(prefix_key(&word), Location::new(id, offset as u32));
        }
    }
}

/// Partition messages into blocks, index and persist each, in one pass.
///
/// Blocks get dense ids from 0 in partition order; every block holds
/// `block_size` messages except possibly the last. Returns the finished
/// index; after this the caller treats it as immutable.
pub fn build_blocks<S: BlockSink>(
    messages: &[ChatMessage],
    config: &StoreConfig,
    sink: &mut S,
) -> Result<PrefixIndex> {
    let size = config.block_size.max(1);
    let mut index = PrefixIndex::new();
    for (n, chunk) in messages.chunks(size).enumerate() {
        let id = BlockId(n as u32);
        index_block(&mut index, id, chunk);
        let bytes = serialize_and_compress(id, chunk)?;
        sink.put(id, &bytes)?;
    }
    Ok(index)
}

/// Parallel build: blocks are indexed and compressed on the rayon pool,
/// then merged and persisted sequentially in id order.
#[cfg(feature = "parallel")]
pub fn build_blocks_parallel<S: BlockSink>(
    messages: &[ChatMessage],
    config: &StoreConfig,
    sink: &mut S,
    progress: Option<&ProgressBar>,
) -> Result<PrefixIndex> {
    let size = config.block_size.max(1);

    // MAP PHASE: one task per block
    let encoded: Vec<(BlockId, PrefixIndex, Vec<u8>)> = messages
        .par_chunks(size)
        .enumerate()
        .map(|(n, chunk)| {
            let id = BlockId(n as u32);
            let mut fragment = PrefixIndex::new();
            index_block(&mut fragment, id, chunk);
            let bytes = serialize_and_compress(id, chunk)?;
            if let Some(pb) = progress {
                pb.inc(1);
            }
            Ok((id, fragment, bytes))
        })
        .collect::<Result<Vec<_>>>()?;

    // REDUCE PHASE: merge fragments, persist in id order
    let mut index = PrefixIndex::new();
    for (id, fragment, bytes) in encoded {
        index.merge(fragment);
        sink.put(id, &bytes)?;
    }
    Ok(index)
}

// ============================================================================
// READ-THROUGH CACHE
// ============================================================================

/// Decompress-on-demand block access with per-run caching.
///
/// The first read of a block fetches, validates, and decompresses it, and
/// counts one decompression event; later reads reuse the cached block.
/// Blocks are immutable once written, so the cache never invalidates.
/// The map lock is held across decompression so that concurrent scorers
/// never decode the same block twice.
#[derive(Debug)]
pub struct BlockCache<S> {
    source: S,
    blocks: Mutex<HashMap<BlockId, Arc<Vec<ChatMessage>>>>,
    decompressions: AtomicUsize,
}

impl<S: BlockSource> BlockCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            blocks: Mutex::new(HashMap::new()),
            decompressions: AtomicUsize::new(0),
        }
    }

    /// Resolve a location to its message.
    ///
    /// An offset past the end of the block means the index and the store
    /// were built from different sequences; that is corruption, not a miss.
    pub fn message(&self, loc: Location) -> Result<ChatMessage> {
        let block = self.block(loc.block)?;
        block
            .get(loc.offset as usize)
            .cloned()
            .ok_or_else(|| {
                Error::corrupt(
                    loc.block,
                    format!(
                        "offset {} out of range ({} messages)",
                        loc.offset,
                        block.len()
                    ),
                )
            })
    }

    fn block(&self, id: BlockId) -> Result<Arc<Vec<ChatMessage>>> {
        let mut guard = self.blocks.lock();
        if let Some(block) = guard.get(&id) {
            return Ok(Arc::clone(block));
        }
        let bytes = self.source.fetch(id)?;
        let messages = Arc::new(decompress_and_parse(id, &bytes)?);
        self.decompressions.fetch_add(1, Ordering::Relaxed);
        guard.insert(id, Arc::clone(&messages));
        Ok(messages)
    }

    /// Total decompression events since this cache was created.
    pub fn decompressions(&self) -> usize {
        self.decompressions.load(Ordering::Relaxed)
    }
}
