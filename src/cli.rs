// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the logsieve command-line interface.
//!
//! Two subcommands: `search` builds the block store and index from a chat
//! log and runs one query against them (the index lives only for the run),
//! and `inspect` examines a single block artifact.

use clap::{Parser, Subcommand};

use logsieve::block::DEFAULT_BLOCK_SIZE;

#[derive(Parser)]
#[command(
    name = "logsieve",
    about = "Fuzzy search over block-compressed chat logs",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build blocks from a chat log and run a query against them
    Search {
        /// Path to the chat log file
        log: String,

        /// Free-text query
        query: String,

        /// Messages per block
        #[arg(short, long, default_value_t = DEFAULT_BLOCK_SIZE)]
        block_size: usize,

        /// Directory for block artifacts
        #[arg(long, default_value = "blocks")]
        blocks_dir: String,
    },

    /// Inspect a block artifact's frame structure
    Inspect {
        /// Path to a .blk file
        file: String,
    },
}
