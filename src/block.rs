// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Block artifact framing.
//!
//! A block is the unit of compression and storage: up to `block_size`
//! messages, serialized as a self-describing JSON array and compressed with
//! brotli. The frame is 14 bytes of fixed header, the compressed payload,
//! and an 8-byte footer: a CRC32 over everything before it plus a magic
//! number (the header magic reversed). If the footer is wrong, something got
//! corrupted or truncated. Don't trust the data.
//!
//! The whole format must round-trip exactly:
//! `decompress_and_parse(id, serialize_and_compress(id, block)) == block`.

use std::io::{Read, Write};

use crc32fast::Hasher as Crc32Hasher;

use crate::error::{Error, Result};
use crate::types::{BlockId, ChatMessage};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Magic bytes: "LSVB" in ASCII (header)
pub const MAGIC: [u8; 4] = [0x4C, 0x53, 0x56, 0x42];

/// Footer magic: "BVSL" (reversed, marks valid artifact end)
pub const FOOTER_MAGIC: [u8; 4] = [0x42, 0x56, 0x53, 0x4C];

/// Current frame version
pub const VERSION: u8 = 1;

/// Default number of messages per block
pub const DEFAULT_BLOCK_SIZE: usize = 100;

/// Brotli window size (log2)
const BROTLI_LGWIN: u32 = 22;

/// Brotli quality. Blocks are written once per run, so favor build speed
/// over the last few percent of ratio.
const BROTLI_QUALITY: u32 = 5;

// ============================================================================
// HEADER
// ============================================================================

/// Block frame header (14 bytes fixed size).
#[derive(Debug, Clone, Copy)]
pub struct BlockHeader {
    pub version: u8,
    /// Number of messages in the decoded block.
    pub message_count: u32,
    /// Compressed payload length in bytes.
    pub payload_len: u32,
}

impl BlockHeader {
    // 4 (magic) + 1 (version) + 1 (reserved) + 2*4 (u32s) = 14
    pub const SIZE: usize = 14;

    fn write(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&MAGIC);
        buf.push(self.version);
        buf.push(0); // reserved
        buf.extend_from_slice(&self.message_count.to_le_bytes());
        buf.extend_from_slice(&self.payload_len.to_le_bytes());
    }

    /// Parse and validate the fixed header. `block` is error context only.
    pub fn read(block: BlockId, bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(Error::corrupt(block, "artifact too short for header"));
        }
        if bytes[0..4] != MAGIC {
            return Err(Error::corrupt(
                block,
                format!("invalid magic: expected LSVB, got {:?}", &bytes[0..4]),
            ));
        }
        let version = bytes[4];
        if version != VERSION {
            return Err(Error::corrupt(
                block,
                format!("unsupported frame version {}", version),
            ));
        }
        Ok(Self {
            version,
            message_count: u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]),
            payload_len: u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]),
        })
    }
}

/// Footer size: 4 bytes CRC32 + 4 bytes magic.
pub const FOOTER_SIZE: usize = 8;

/// Compute the CRC32 the footer stores: everything before the footer.
pub fn compute_crc32(data: &[u8]) -> u32 {
    let mut hasher = Crc32Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

// ============================================================================
// ENCODE / DECODE
// ============================================================================

/// Serialize a block of messages and compress it into a framed artifact.
pub fn serialize_and_compress(block: BlockId, messages: &[ChatMessage]) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(messages)
        .map_err(|e| Error::corrupt(block, format!("encode: {}", e)))?;

    let mut payload = Vec::new();
    {
        let mut encoder =
            brotli::CompressorWriter::new(&mut payload, 4096, BROTLI_QUALITY, BROTLI_LGWIN);
        encoder
            .write_all(&json)
            .map_err(|e| Error::corrupt(block, format!("compress: {}", e)))?;
        // dropping the encoder finalizes the stream into `payload`
    }

    let header = BlockHeader {
        version: VERSION,
        message_count: messages.len() as u32,
        payload_len: payload.len() as u32,
    };

    let mut buf = Vec::with_capacity(BlockHeader::SIZE + payload.len() + FOOTER_SIZE);
    header.write(&mut buf);
    buf.extend_from_slice(&payload);
    let crc = compute_crc32(&buf);
    buf.extend_from_slice(&crc.to_le_bytes());
    buf.extend_from_slice(&FOOTER_MAGIC);
    Ok(buf)
}

/// Validate a framed artifact and decode it back into messages.
///
/// Checks, in order: length, header magic and version, footer magic, CRC32,
/// declared payload length, then decompresses and parses. Any failure is
/// `Error::Corrupt` for this block - fatal to the query resolving it.
pub fn decompress_and_parse(block: BlockId, bytes: &[u8]) -> Result<Vec<ChatMessage>> {
    let header = BlockHeader::read(block, bytes)?;

    if bytes.len() < BlockHeader::SIZE + FOOTER_SIZE {
        return Err(Error::corrupt(block, "artifact too short for footer"));
    }
    let footer_start = bytes.len() - FOOTER_SIZE;
    if bytes[footer_start + 4..] != FOOTER_MAGIC {
        return Err(Error::corrupt(block, "invalid footer magic"));
    }
    let stored_crc = u32::from_le_bytes([
        bytes[footer_start],
        bytes[footer_start + 1],
        bytes[footer_start + 2],
        bytes[footer_start + 3],
    ]);
    let actual_crc = compute_crc32(&bytes[..footer_start]);
    if stored_crc != actual_crc {
        return Err(Error::corrupt(
            block,
            format!("crc mismatch: stored {:08x}, actual {:08x}", stored_crc, actual_crc),
        ));
    }

    if BlockHeader::SIZE + header.payload_len as usize + FOOTER_SIZE != bytes.len() {
        return Err(Error::corrupt(block, "payload length does not match frame"));
    }
    let payload = &bytes[BlockHeader::SIZE..footer_start];

    let mut json = Vec::new();
    brotli::Decompressor::new(payload, 4096)
        .read_to_end(&mut json)
        .map_err(|e| Error::corrupt(block, format!("decompress: {}", e)))?;

    let messages: Vec<ChatMessage> = serde_json::from_slice(&json)
        .map_err(|e| Error::corrupt(block, format!("parse: {}", e)))?;

    if messages.len() != header.message_count as usize {
        return Err(Error::corrupt(
            block,
            format!(
                "message count mismatch: header {}, decoded {}",
                header.message_count,
                messages.len()
            ),
        ));
    }
    Ok(messages)
}
