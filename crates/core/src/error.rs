//! The top-level error type returned by the sender and receiver drive
//! loops.

use std::io;

use thiserror::Error;

use crate::exit_code::ExitCode;

/// Failures that can terminate a transfer.
///
/// Both binaries' `main` functions match on this enum only to pick an
/// [`ExitCode`] and format a one-line diagnostic on failure; everything
/// else is handled by `tracing` as the transfer progresses.
#[derive(Debug, Error)]
pub enum XferError {
    /// A socket or filesystem operation failed.
    #[error("i/o error: {0}")]
    Io(#[source] io::Error),
    /// A chunk's integrity check never passed after exhausting retries.
    #[error("checksum verification failed for chunk {seq} after {retries} retries")]
    Checksum {
        /// The chunk's sequence number.
        seq: i32,
        /// How many attempts were made before giving up.
        retries: u32,
    },
    /// A chunk never decompressed successfully after exhausting retries.
    #[error("decompression failed for chunk {seq} after {retries} retries")]
    Decompression {
        /// The chunk's sequence number.
        seq: i32,
        /// How many attempts were made before giving up.
        retries: u32,
    },
    /// The destination path could not be created or opened.
    #[error("destination error at {component}: {reason}")]
    Destination {
        /// The path component that failed.
        component: String,
        /// The receiver's description of why.
        reason: String,
    },
    /// Bad command-line arguments or a missing source file.
    #[error("usage error: {0}")]
    Usage(String),
    /// A control-channel read or connect attempt exceeded its deadline.
    #[error("timed out waiting on the control channel")]
    Timeout,
    /// The control channel sent a message that made no sense in context.
    #[error("protocol violation: {0}")]
    Protocol(String),
}

impl From<io::Error> for XferError {
    fn from(source: io::Error) -> Self {
        Self::Io(source)
    }
}

impl XferError {
    /// Maps this error onto the [`ExitCode`] category that drives the
    /// process's final exit status.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::Io(_) => ExitCode::Io,
            Self::Checksum { .. } => ExitCode::Checksum,
            Self::Decompression { .. } => ExitCode::Decompression,
            Self::Destination { .. } => ExitCode::Destination,
            Self::Usage(_) => ExitCode::Usage,
            Self::Timeout => ExitCode::Timeout,
            Self::Protocol(_) => ExitCode::Protocol,
        }
    }
}
