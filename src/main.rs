use std::fs;
use std::path::Path;
use std::process;
use std::time::Instant;

use clap::Parser;

#[cfg(feature = "parallel")]
use indicatif::{ProgressBar, ProgressStyle};

use logsieve::block::{decompress_and_parse, BlockHeader, FOOTER_SIZE};
#[cfg(not(feature = "parallel"))]
use logsieve::build_blocks;
#[cfg(feature = "parallel")]
use logsieve::build_blocks_parallel;
#[cfg(not(feature = "parallel"))]
use logsieve::search;
#[cfg(feature = "parallel")]
use logsieve::search_parallel;
use logsieve::{parse_log, BlockCache, BlockId, DirStore, StoreConfig};

mod cli;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Search {
            log,
            query,
            block_size,
            blocks_dir,
        } => run_search(&log, &query, block_size, &blocks_dir),
        Commands::Inspect { file } => inspect_block_file(&file),
    };
    if let Err(e) = result {
        eprintln!("❌ {}", e);
        process::exit(1);
    }
}

/// Create a progress style for the build progress bar
#[cfg(feature = "parallel")]
fn create_progress_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.cyan} {prefix:<12} [{bar:40.cyan/dim}] {pos}/{len} {msg}",
    )
    .unwrap()
    .progress_chars("━━╸")
}

/// Build blocks + index from the log, run the query, print results.
fn run_search(log: &str, query: &str, block_size: usize, blocks_dir: &str) -> Result<(), String> {
    let raw = fs::read_to_string(log).map_err(|e| format!("Failed to read {}: {}", log, e))?;
    let messages = parse_log(&raw).map_err(|e| e.to_string())?;

    let mut store = DirStore::create(blocks_dir)
        .map_err(|e| format!("Failed to create {}: {}", blocks_dir, e))?;
    let config = StoreConfig { block_size };

    #[cfg(feature = "parallel")]
    let index = {
        let block_count = messages.len().div_ceil(block_size.max(1));
        let pb = ProgressBar::new(block_count as u64);
        pb.set_style(create_progress_style());
        pb.set_prefix("Building");
        pb.set_message("blocks...");
        let index = build_blocks_parallel(&messages, &config, &mut store, Some(&pb))
            .map_err(|e| e.to_string())?;
        pb.finish_and_clear();
        index
    };
    #[cfg(not(feature = "parallel"))]
    let index = build_blocks(&messages, &config, &mut store).map_err(|e| e.to_string())?;

    let cache = BlockCache::new(store);

    let start = Instant::now();
    #[cfg(feature = "parallel")]
    let outcome = search_parallel(&index, &cache, query).map_err(|e| e.to_string())?;
    #[cfg(not(feature = "parallel"))]
    let outcome = search(&index, &cache, query).map_err(|e| e.to_string())?;
    let elapsed = start.elapsed();

    for hit in &outcome.results {
        println!(">>>{} - {}", hit.user, hit.excerpt);
    }
    println!();
    println!("searched {} candidates", outcome.stats.candidates);
    println!("decompressed {} blocks", outcome.stats.blocks_decompressed);
    println!("search completed in {}ms", elapsed.as_millis());
    Ok(())
}

/// Display a block artifact's frame structure and validate it end to end.
fn inspect_block_file(file: &str) -> Result<(), String> {
    let bytes = fs::read(file).map_err(|e| format!("Failed to read {}: {}", file, e))?;

    // Use the filename stem as the block id where it parses as one.
    let id = Path::new(file)
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.parse::<u32>().ok())
        .map(BlockId)
        .unwrap_or(BlockId(0));

    let header = BlockHeader::read(id, &bytes).map_err(|e| e.to_string())?;
    println!("{}", file);
    println!("  version:     {}", header.version);
    println!("  messages:    {}", header.message_count);
    println!("  payload:     {} bytes (brotli)", header.payload_len);
    println!(
        "  frame:       {} bytes ({} header + payload + {} footer)",
        bytes.len(),
        BlockHeader::SIZE,
        FOOTER_SIZE
    );

    match decompress_and_parse(id, &bytes) {
        Ok(messages) => {
            println!("  integrity:   ok");
            if let (Some(first), Some(last)) = (messages.first(), messages.last()) {
                println!("  time range:  {}..{}", first.timestamp, last.timestamp);
            }
            Ok(())
        }
        Err(e) => Err(e.to_string()),
    }
}
