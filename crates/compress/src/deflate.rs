//! # Overview
//!
//! Raw DEFLATE compression for the per-transfer compression pass.
//!
//! # Wire Format
//!
//! Raw deflate produces a bare DEFLATE stream without the 2-byte zlib
//! header or 4-byte Adler-32 trailer, matching `deflateInit2()` called with
//! a negative `windowBits`. This keeps the on-wire payload minimal since
//! the surrounding packet already carries its own integrity trailer.
//!
//! # Design
//!
//! The pass always compresses at the highest DEFLATE level; the protocol
//! has no notion of a negotiated compression level, only a transfer-global
//! on/off flag. [`compress_chunk`] treats "the codec errored" and "the
//! compressed output did not fit the chunk's budget" as the same failure,
//! since the sender's only recourse in either case is to abort the
//! transfer (see [`CompressError`]). [`decompress_chunk`] bounds the
//! amount of memory an attacker-controlled or corrupted stream can force
//! the receiver to allocate.

use std::io::{self, Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use thiserror::Error;

/// Failures from the compression pass.
#[derive(Debug, Error)]
pub enum CompressError {
    /// The DEFLATE codec reported an I/O error while compressing or
    /// decompressing.
    #[error("compression codec error: {0}")]
    Codec(#[source] io::Error),
    /// The compressed output exceeded the chunk's size budget.
    #[error("compressed output ({compressed} bytes) exceeds chunk budget ({budget} bytes)")]
    OverBudget {
        /// Size of the compressed output, in bytes.
        compressed: usize,
        /// The chunk budget it failed to fit.
        budget: usize,
    },
    /// Decompressed output exceeded the expansion cap before the stream
    /// was exhausted.
    #[error("decompressed output exceeded the {cap}-byte expansion cap")]
    ExpansionCapExceeded {
        /// The cap that was exceeded, in bytes.
        cap: usize,
    },
}

/// Compresses `payload` at the highest DEFLATE level.
///
/// Fails with [`CompressError::OverBudget`] if the compressed result is not
/// smaller than `budget` (typically the uncompressed chunk size), since a
/// compression pass that does not shrink the payload provides no benefit
/// and the protocol has no per-chunk fallback to raw bytes.
///
/// # Errors
///
/// Returns [`CompressError::Codec`] if the underlying DEFLATE stream fails,
/// or [`CompressError::OverBudget`] if the result does not fit `budget`.
pub fn compress_chunk(payload: &[u8], budget: usize) -> Result<Vec<u8>, CompressError> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(payload).map_err(CompressError::Codec)?;
    let compressed = encoder.finish().map_err(CompressError::Codec)?;
    if compressed.len() > budget {
        return Err(CompressError::OverBudget {
            compressed: compressed.len(),
            budget,
        });
    }
    Ok(compressed)
}

/// Decompresses `payload`, aborting if the output would exceed
/// `expansion_cap` bytes.
///
/// # Errors
///
/// Returns [`CompressError::Codec`] if the stream is malformed, or
/// [`CompressError::ExpansionCapExceeded`] if decompressing would produce
/// more than `expansion_cap` bytes.
pub fn decompress_chunk(payload: &[u8], expansion_cap: usize) -> Result<Vec<u8>, CompressError> {
    let mut decoder = DeflateDecoder::new(payload).take(expansion_cap as u64 + 1);
    let mut output = Vec::new();
    decoder
        .read_to_end(&mut output)
        .map_err(CompressError::Codec)?;
    if output.len() > expansion_cap {
        return Err(CompressError::ExpansionCapExceeded { cap: expansion_cap });
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_compressible_payload() {
        let payload = b"The quick brown fox jumps over the lazy dog".repeat(32);
        let compressed = compress_chunk(&payload, payload.len()).expect("fits budget");
        assert!(compressed.len() < payload.len());
        let decompressed = decompress_chunk(&compressed, payload.len() * 2).expect("decompress");
        assert_eq!(decompressed, payload);
    }

    #[test]
    fn rejects_compression_that_does_not_fit_budget() {
        let payload: Vec<u8> = (0..=255u8).collect();
        let err = compress_chunk(&payload, 4).unwrap_err();
        assert!(matches!(err, CompressError::OverBudget { .. }));
    }

    #[test]
    fn empty_payload_round_trips() {
        let compressed = compress_chunk(b"", 64).expect("empty payload fits any budget");
        let decompressed = decompress_chunk(&compressed, 0).expect("decompress empty");
        assert!(decompressed.is_empty());
    }

    #[test]
    fn decompression_enforces_expansion_cap() {
        let payload = vec![0u8; 1_000_000];
        let compressed = compress_chunk(&payload, payload.len()).expect("fits budget");
        let err = decompress_chunk(&compressed, 1_000).unwrap_err();
        assert!(matches!(err, CompressError::ExpansionCapExceeded { cap: 1_000 }));
    }

    #[test]
    fn malformed_stream_is_reported_as_codec_error() {
        let garbage = vec![0xffu8; 64];
        let err = decompress_chunk(&garbage, 1024).unwrap_err();
        assert!(matches!(err, CompressError::Codec(_)));
    }
}
