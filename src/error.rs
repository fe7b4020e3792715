//! Crate error type.
//!
//! Three kinds, matching the three ways this system can fail:
//! a malformed log line (fatal to ingestion), an unreadable block artifact,
//! and an artifact that reads but fails validation or decoding. A storage
//! failure aborts the in-flight query and is surfaced to the caller; there
//! are no retries and no partial-block recovery. An empty or unmatched
//! query is not an error - it yields zero results.

use std::io;

use crate::types::BlockId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed chat log line. Fatal to ingestion.
    #[error("log line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// Block artifact could not be read from the source.
    #[error("block {block}: {source}")]
    Storage {
        block: BlockId,
        #[source]
        source: io::Error,
    },

    /// Block artifact bytes failed validation or decoding.
    #[error("block {block}: {reason}")]
    Corrupt { block: BlockId, reason: String },
}

impl Error {
    /// Shorthand for a corruption error with formatted context.
    pub(crate) fn corrupt(block: BlockId, reason: impl Into<String>) -> Self {
        Error::Corrupt {
            block,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
