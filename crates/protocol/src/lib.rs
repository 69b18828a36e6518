#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `protocol` is the wire layer shared by the sender and receiver: it
//! frames and verifies data-channel packets ([`packet`]) and encodes and
//! decodes control-channel messages and the incremental sub-exchange's
//! probe datagrams ([`control`]). Nothing in this crate touches sockets —
//! it only turns typed values into bytes and back.
//!
//! # See also
//!
//! The `transfer` crate drives the state machines that call into this
//! crate's functions over real UDP and TCP connections.

pub mod control;
pub mod error;
pub mod packet;

pub use control::{build_incremental_probe, parse_incremental_probe, ControlMessage};
pub use error::{ControlDecodeError, ProtocolError};
pub use packet::{
    build_data_packet, build_end_packet, build_metadata_packet, is_end_packet,
    parse_and_verify, parse_metadata_payload, ParsedPacket, END_PACKET_LEN, END_SEQ, HEADER_LEN,
    METADATA_SEQ, MIN_PACKET_LEN, TRAILER_LEN,
};

/// Default UDP data-channel port.
pub const DEFAULT_UDP_PORT: u16 = 12345;
/// Default TCP control-channel port.
pub const DEFAULT_TCP_PORT: u16 = 12346;

/// Smallest chunk size the dynamic sizing heuristic will request.
pub const MIN_CHUNK: u32 = 8096;
/// Largest chunk size the dynamic sizing heuristic will request.
pub const MAX_CHUNK: u32 = 60_000;
/// Weight given to the previous chunk size in the dynamic sizing formula.
pub const CHUNK_SIZE_ALPHA: f64 = 0.5;
/// Weight given to the round-trip timing signal in the dynamic sizing formula.
pub const CHUNK_SIZE_BETA: f64 = 0.5;

/// Overall retry budget for a single chunk (checksum or decompression
/// failure, or an ack timeout).
pub const MAX_RETRIES: u32 = 20;
/// Immediate retry budget for the metadata packet before falling back to
/// the shared per-chunk retry/backoff loop.
pub const METADATA_IMMEDIATE_RETRIES: u32 = 5;
/// Control-channel receive timeout.
pub const CONTROL_RECV_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);
/// Initial control-channel connect timeout.
pub const CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(20);
/// Backoff between retries.
pub const RETRY_BACKOFF: std::time::Duration = std::time::Duration::from_secs(1);
/// Cap on the amount of memory a single chunk's decompression may expand
/// to, regardless of what the compressed payload claims.
pub const DECOMPRESSION_EXPANSION_CAP: usize = 1 << 30;
