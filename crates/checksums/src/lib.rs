#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `checksums` provides the 32-bit integrity hash used to stamp and verify
//! every packet exchanged between the sender and the receiver.
//!
//! # Design
//!
//! The crate exposes a single function, [`murmur32`], wrapping the
//! `murmur3` crate's 32-bit x86 variant (`MurmurHash3_x86_32`) with a fixed
//! seed of `0`. Higher layers never call the underlying crate directly so
//! the seed and algorithm choice stay centralised in one place.
//!
//! # Invariants
//!
//! - The hash is computed over the buffer exactly as given; callers are
//!   responsible for zeroing the trailer region before hashing, matching
//!   the wire format's checksum convention.
//! - [`murmur32`] never panics; reading from an in-memory slice cannot fail.
//!
//! # Examples
//!
//! ```
//! use checksums::murmur32;
//!
//! let a = murmur32(b"HELLO WORLD!");
//! let b = murmur32(b"HELLO WORLD!");
//! assert_eq!(a, b);
//!
//! let c = murmur32(b"HELLO WORLD?");
//! assert_ne!(a, c);
//! ```

use std::io::Cursor;

/// Seed used for every Murmur32 computation in this protocol.
const SEED: u32 = 0;

/// Computes `MurmurHash3_x86_32` over `data` with the protocol's fixed seed.
///
/// # Examples
///
/// ```
/// use checksums::murmur32;
///
/// assert_eq!(murmur32(b""), murmur32(b""));
/// ```
#[must_use]
pub fn murmur32(data: &[u8]) -> u32 {
    let mut cursor = Cursor::new(data);
    murmur3::murmur3_32(&mut cursor, SEED).expect("hashing an in-memory slice cannot fail")
}
