//! Process exit codes for the sender and receiver binaries.
//!
//! This module provides a unified [`ExitCode`] enum that both binaries use
//! to translate an [`XferError`](crate::error::XferError) into a
//! [`std::process::ExitCode`]. Only three values ever actually reach the
//! shell (`0`, `1`, `3`); the remaining variants exist to give each failure
//! category a distinct, loggable identity before it collapses onto one of
//! those three on the way out of `main`.
//!
//! # Examples
//!
//! ```
//! use core::exit_code::ExitCode;
//!
//! assert_eq!(ExitCode::Destination.as_i32(), 3);
//! assert_eq!(ExitCode::Destination.to_process_exit_code(), 3);
//! ```

use std::fmt;

/// A failure category, carrying both a human-readable description and the
/// shell-visible exit code it collapses onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExitCode {
    /// The transfer completed successfully.
    Success = 0,
    /// Bad command-line arguments, or the source file does not exist.
    Usage = 1,
    /// The control channel reported a protocol violation: an unexpected
    /// message where an ack, `NOT`/`SEND`/`NEW FILE !`, or error text was
    /// expected.
    Protocol = 2,
    /// The destination path could not be created or opened, or a
    /// positional destination argument failed its trailing-slash
    /// validation.
    Destination = 3,
    /// An underlying socket or filesystem I/O operation failed.
    Io = 11,
    /// A chunk's Murmur32 trailer never matched after exhausting retries.
    Checksum = 12,
    /// A chunk never decompressed successfully after exhausting retries.
    Decompression = 13,
    /// A control-channel read or connect attempt exceeded its deadline
    /// after exhausting retries.
    Timeout = 30,
}

impl ExitCode {
    /// Returns the raw discriminant used for logging and tests.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Collapses this category onto the shell-visible exit code it
    /// belongs to: `0` for success, `3` for destination errors, `1` for
    /// everything else.
    #[must_use]
    pub const fn to_process_exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Destination => 3,
            Self::Usage
            | Self::Protocol
            | Self::Io
            | Self::Checksum
            | Self::Decompression
            | Self::Timeout => 1,
        }
    }

    /// Returns a short, lowercase description suitable for the one-line
    /// diagnostic printed on failure.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Usage => "usage error",
            Self::Protocol => "protocol violation",
            Self::Destination => "destination error",
            Self::Io => "i/o error",
            Self::Checksum => "checksum verification exhausted retries",
            Self::Decompression => "decompression exhausted retries",
            Self::Timeout => "timed out",
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code.to_process_exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_maps_to_zero() {
        assert_eq!(ExitCode::Success.to_process_exit_code(), 0);
    }

    #[test]
    fn destination_maps_to_three() {
        assert_eq!(ExitCode::Destination.to_process_exit_code(), 3);
    }

    #[test]
    fn everything_else_maps_to_one() {
        for code in [
            ExitCode::Usage,
            ExitCode::Protocol,
            ExitCode::Io,
            ExitCode::Checksum,
            ExitCode::Decompression,
            ExitCode::Timeout,
        ] {
            assert_eq!(code.to_process_exit_code(), 1, "{code:?} should map to 1");
        }
    }

    #[test]
    fn descriptions_are_non_empty() {
        for code in [
            ExitCode::Success,
            ExitCode::Usage,
            ExitCode::Protocol,
            ExitCode::Destination,
            ExitCode::Io,
            ExitCode::Checksum,
            ExitCode::Decompression,
            ExitCode::Timeout,
        ] {
            assert!(!code.description().is_empty());
        }
    }

    #[test]
    fn converts_into_process_exit_code() {
        let process_code: std::process::ExitCode = ExitCode::Destination.into();
        assert_eq!(
            format!("{process_code:?}"),
            format!("{:?}", std::process::ExitCode::from(3))
        );
    }
}
