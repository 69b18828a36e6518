//! Control-channel (TCP) message codec.
//!
//! # Overview
//!
//! The control channel carries short, line-oriented ASCII messages from the
//! receiver back to the sender: per-chunk acknowledgements, checksum and
//! decompression failures, the incremental sub-exchange's verdicts, and a
//! catch-all for destination-path errors. Every message is terminated with
//! `\n` on the wire; [`ControlMessage::encode`] appends it and
//! [`ControlMessage::parse`] expects it stripped by the caller's line reader.
//!
//! # Design
//!
//! Acknowledgements are the decimal text of the chunk sequence number
//! rather than a binary integer, matching the rest of the control channel's
//! plain-text convention. Anything that is not one of the fixed literals
//! and does not parse as a sequence number is treated as a path error: the
//! receiver reports why it could not create the destination path verbatim,
//! and the sender surfaces that text to the operator unchanged.

use crate::error::ControlDecodeError;

const INCORRECT_CRC: &str = "INCORRECT CRC";
const FAILED_DECOMPRESSION: &str = "FAILED DECOMPRESSION";
const NOT: &str = "NOT";
const SEND: &str = "SEND";
const NEW_FILE: &str = "NEW FILE !";

/// A message sent by the receiver to the sender over the control channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    /// Acknowledges successful receipt of the chunk with this sequence
    /// number.
    Ack(i32),
    /// The most recently received chunk failed its integrity check.
    IncorrectCrc,
    /// The most recently received chunk failed to decompress.
    FailedDecompression,
    /// Incremental sub-exchange: the existing block matches, skip it.
    Not,
    /// Incremental sub-exchange: the existing block differs, send it.
    Send,
    /// Incremental sub-exchange: the destination file does not exist yet.
    NewFile,
    /// The destination path could not be created or opened; carries the
    /// receiver's description of which component failed and why.
    PathError(String),
}

impl ControlMessage {
    /// Encodes this message as a newline-terminated ASCII line.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut line = match self {
            Self::Ack(seq) => seq.to_string(),
            Self::IncorrectCrc => INCORRECT_CRC.to_string(),
            Self::FailedDecompression => FAILED_DECOMPRESSION.to_string(),
            Self::Not => NOT.to_string(),
            Self::Send => SEND.to_string(),
            Self::NewFile => NEW_FILE.to_string(),
            Self::PathError(detail) => detail.clone(),
        };
        line.push('\n');
        line
    }

    /// Parses a single line (without its trailing newline) into a
    /// [`ControlMessage`].
    ///
    /// Any text that is not a recognized literal and does not parse as a
    /// sequence number is treated as [`ControlMessage::PathError`] rather
    /// than rejected, since the receiver is free to report filesystem
    /// errors in its own words.
    pub fn parse(line: &str) -> Result<Self, ControlDecodeError> {
        if line.is_empty() {
            return Err(ControlDecodeError::Empty);
        }
        let message = match line {
            INCORRECT_CRC => Self::IncorrectCrc,
            FAILED_DECOMPRESSION => Self::FailedDecompression,
            NOT => Self::Not,
            SEND => Self::Send,
            NEW_FILE => Self::NewFile,
            other => match other.parse::<i32>() {
                Ok(seq) => Self::Ack(seq),
                Err(_) => Self::PathError(other.to_string()),
            },
        };
        Ok(message)
    }
}

const DATA_CRC_PREFIX: &str = "DATA_CRC:";

/// Builds the sender's incremental-transfer probe, sent as a raw ASCII
/// datagram on the data channel (not framed like [`crate::packet`]
/// packets).
#[must_use]
pub fn build_incremental_probe(crc: u32) -> Vec<u8> {
    format!("{DATA_CRC_PREFIX}{crc:08x}").into_bytes()
}

/// Parses an incremental-transfer probe datagram, returning the block CRC
/// it carries, or `None` if `datagram` is not a probe.
#[must_use]
pub fn parse_incremental_probe(datagram: &[u8]) -> Option<u32> {
    let text = std::str::from_utf8(datagram).ok()?;
    let hex = text.strip_prefix(DATA_CRC_PREFIX)?;
    u32::from_str_radix(hex, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_round_trips() {
        let encoded = ControlMessage::Ack(42).encode();
        assert_eq!(encoded, "42\n");
        assert_eq!(ControlMessage::parse("42"), Ok(ControlMessage::Ack(42)));
    }

    #[test]
    fn fixed_literals_round_trip() {
        for message in [
            ControlMessage::IncorrectCrc,
            ControlMessage::FailedDecompression,
            ControlMessage::Not,
            ControlMessage::Send,
            ControlMessage::NewFile,
        ] {
            let encoded = message.encode();
            let line = encoded.trim_end_matches('\n');
            assert_eq!(ControlMessage::parse(line), Ok(message));
        }
    }

    #[test]
    fn unrecognized_text_is_a_path_error() {
        let parsed = ControlMessage::parse("Permission denied: /mnt/ro/out.bin").unwrap();
        assert_eq!(
            parsed,
            ControlMessage::PathError("Permission denied: /mnt/ro/out.bin".to_string())
        );
    }

    #[test]
    fn empty_line_is_rejected() {
        assert_eq!(ControlMessage::parse(""), Err(ControlDecodeError::Empty));
    }

    #[test]
    fn incremental_probe_round_trips() {
        let probe = build_incremental_probe(0xdead_beef);
        assert_eq!(probe, b"DATA_CRC:deadbeef");
        assert_eq!(parse_incremental_probe(&probe), Some(0xdead_beef));
    }

    #[test]
    fn non_probe_datagram_is_not_mistaken_for_one() {
        assert_eq!(parse_incremental_probe(b"SEND"), None);
        assert_eq!(parse_incremental_probe(&[0xff, 0x00, 0x01]), None);
    }
}
