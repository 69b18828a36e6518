#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `compress` implements the transfer's optional compression pass: a raw
//! DEFLATE codec applied to each chunk's payload when the sender enables
//! `-c/--compress`. See [`deflate`] for the compress/decompress functions
//! and their failure semantics.
//!
//! # Examples
//!
//! ```
//! use compress::deflate::{compress_chunk, decompress_chunk};
//!
//! let payload = b"payload worth compressing, repeated ".repeat(8);
//! let compressed = compress_chunk(&payload, payload.len()).expect("fits budget");
//! let restored = decompress_chunk(&compressed, payload.len() * 2).expect("decompress");
//! assert_eq!(restored, payload);
//! ```

pub mod deflate;

pub use deflate::{compress_chunk, decompress_chunk, CompressError};
