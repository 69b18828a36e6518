//! Error types for packet framing and control-channel decoding.

use thiserror::Error;

/// Failures that can occur while parsing a data-channel packet.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// The datagram is too short to contain a valid header and trailer.
    #[error("datagram shorter than the minimum packet size")]
    Truncated,
    /// The trailer hash does not match the recomputed hash.
    #[error("packet failed its integrity check")]
    ChecksumMismatch,
    /// A metadata packet's path component is not valid UTF-8.
    #[error("metadata packet path is not valid UTF-8")]
    InvalidPath,
}

/// Failures that can occur while decoding a control-channel message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControlDecodeError {
    /// The line was empty.
    #[error("empty control message")]
    Empty,
}
