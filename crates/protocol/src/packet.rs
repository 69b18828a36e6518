//! Data-channel packet framing and the Murmur32 integrity trailer.
//!
//! # Wire format
//!
//! ```text
//! +----------------+------------------+-----------------+----------------+
//! | seq: i32 (LE)  | next_size: u32   | payload (var)   | trailer: u32   |
//! +----------------+------------------+-----------------+----------------+
//! ```
//!
//! `seq == 0` marks the metadata packet, `seq == -1` marks end-of-transfer
//! (which is encoded without a header or trailer — see [`build_end_packet`]),
//! and `seq > 0` indexes a data chunk. The trailer holds the little-endian
//! Murmur32 hash of the packet with the trailer bytes zeroed.

use std::mem::size_of;

use checksums::murmur32;

use crate::error::ProtocolError;

/// Size in bytes of the `seq` + `next_size` header.
pub const HEADER_LEN: usize = 8;
/// Size in bytes of the trailing integrity hash.
pub const TRAILER_LEN: usize = 4;
/// Smallest packet that can carry a valid trailer (empty payload).
pub const MIN_PACKET_LEN: usize = HEADER_LEN + TRAILER_LEN;
/// `seq` value reserved for the metadata packet.
pub const METADATA_SEQ: i32 = 0;
/// `seq` value that marks end-of-transfer.
pub const END_SEQ: i32 = -1;
/// Byte length of the bare end-of-transfer packet.
pub const END_PACKET_LEN: usize = size_of::<i32>();

/// A framed packet parsed and checksum-verified from the data channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedPacket<'a> {
    /// Sequence number (`0` for metadata, `>0` for data chunks).
    pub seq: i32,
    /// The sender's hint for the size of the next chunk.
    pub next_size: u32,
    /// The packet's payload, excluding header and trailer.
    pub payload: &'a [u8],
}

/// Computes the trailer hash for `packet`, treating the last
/// [`TRAILER_LEN`] bytes as zeroed regardless of their current contents.
fn trailer_hash(packet: &[u8]) -> u32 {
    debug_assert!(packet.len() >= TRAILER_LEN);
    let split = packet.len() - TRAILER_LEN;
    let mut zeroed = Vec::with_capacity(packet.len());
    zeroed.extend_from_slice(&packet[..split]);
    zeroed.extend_from_slice(&[0u8; TRAILER_LEN]);
    murmur32(&zeroed)
}

/// Appends a zeroed trailer, stamps it with the packet's Murmur32 hash, and
/// returns the finished buffer.
fn seal(mut packet: Vec<u8>) -> Vec<u8> {
    packet.extend_from_slice(&[0u8; TRAILER_LEN]);
    let hash = trailer_hash(&packet);
    let split = packet.len() - TRAILER_LEN;
    packet[split..].copy_from_slice(&hash.to_le_bytes());
    packet
}

/// Builds the `seq = 0` metadata packet carrying the destination path and
/// the transfer-global compression flag.
///
/// `dest_path` must not contain NUL bytes; the wire format otherwise treats
/// it as an opaque UTF-8 byte string.
#[must_use]
pub fn build_metadata_packet(dest_path: &str, chunk_size_hint: u32, compress: bool) -> Vec<u8> {
    let mut packet = Vec::with_capacity(HEADER_LEN + dest_path.len() + 4 + TRAILER_LEN);
    packet.extend_from_slice(&METADATA_SEQ.to_le_bytes());
    packet.extend_from_slice(&chunk_size_hint.to_le_bytes());
    packet.extend_from_slice(dest_path.as_bytes());
    let flag: u32 = u32::from(compress);
    packet.extend_from_slice(&flag.to_le_bytes());
    seal(packet)
}

/// Splits a verified metadata packet's payload into the destination path
/// and the compression flag.
pub fn parse_metadata_payload(payload: &[u8]) -> Result<(&str, bool), ProtocolError> {
    if payload.len() < 4 {
        return Err(ProtocolError::Truncated);
    }
    let split = payload.len() - 4;
    let flag_bytes: [u8; 4] = payload[split..].try_into().expect("exactly 4 bytes");
    let compress = u32::from_le_bytes(flag_bytes) != 0;
    let path = std::str::from_utf8(&payload[..split]).map_err(|_| ProtocolError::InvalidPath)?;
    Ok((path, compress))
}

/// Builds a `seq > 0` data packet carrying `payload` (raw or compressed,
/// depending on the transfer's compression flag).
///
/// # Panics
///
/// Panics if `seq` is not strictly positive; callers only ever build data
/// packets for chunk indices starting at 1.
#[must_use]
pub fn build_data_packet(seq: i32, next_size_hint: u32, payload: &[u8]) -> Vec<u8> {
    assert!(seq > 0, "data packets require a positive sequence number");
    let mut packet = Vec::with_capacity(HEADER_LEN + payload.len() + TRAILER_LEN);
    packet.extend_from_slice(&seq.to_le_bytes());
    packet.extend_from_slice(&next_size_hint.to_le_bytes());
    packet.extend_from_slice(payload);
    seal(packet)
}

/// Builds the bare 4-byte end-of-transfer packet. It carries no trailer and
/// is matched by the receiver on size and value alone.
#[must_use]
pub fn build_end_packet() -> Vec<u8> {
    END_SEQ.to_le_bytes().to_vec()
}

/// Returns `true` if `datagram` is the end-of-transfer marker.
#[must_use]
pub fn is_end_packet(datagram: &[u8]) -> bool {
    datagram.len() == END_PACKET_LEN
        && i32::from_le_bytes(datagram.try_into().expect("checked length")) == END_SEQ
}

/// Parses a framed packet and verifies its trailer hash.
///
/// Returns [`ProtocolError::Truncated`] if `datagram` is shorter than
/// [`MIN_PACKET_LEN`], and [`ProtocolError::ChecksumMismatch`] if the
/// trailer does not match the recomputed hash.
pub fn parse_and_verify(datagram: &[u8]) -> Result<ParsedPacket<'_>, ProtocolError> {
    if datagram.len() < MIN_PACKET_LEN {
        return Err(ProtocolError::Truncated);
    }
    let expected = trailer_hash(datagram);
    let split = datagram.len() - TRAILER_LEN;
    let stamped = u32::from_le_bytes(
        datagram[split..]
            .try_into()
            .expect("exactly TRAILER_LEN bytes"),
    );
    if stamped != expected {
        return Err(ProtocolError::ChecksumMismatch);
    }
    let seq = i32::from_le_bytes(datagram[..4].try_into().expect("exactly 4 bytes"));
    let next_size = u32::from_le_bytes(datagram[4..HEADER_LEN].try_into().expect("4 bytes"));
    Ok(ParsedPacket {
        seq,
        next_size,
        payload: &datagram[HEADER_LEN..split],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_packet_round_trips() {
        let packet = build_data_packet(7, 12_345, b"payload bytes");
        let parsed = parse_and_verify(&packet).expect("valid packet");
        assert_eq!(parsed.seq, 7);
        assert_eq!(parsed.next_size, 12_345);
        assert_eq!(parsed.payload, b"payload bytes");
    }

    #[test]
    fn empty_payload_round_trips() {
        let packet = build_data_packet(1, 8_096, b"");
        let parsed = parse_and_verify(&packet).expect("valid packet");
        assert_eq!(parsed.payload, b"");
    }

    #[test]
    fn metadata_packet_round_trips() {
        let packet = build_metadata_packet("dir/file.bin", 8_096, true);
        let parsed = parse_and_verify(&packet).expect("valid packet");
        assert_eq!(parsed.seq, METADATA_SEQ);
        let (path, compress) = parse_metadata_payload(parsed.payload).expect("valid metadata");
        assert_eq!(path, "dir/file.bin");
        assert!(compress);
    }

    #[test]
    fn metadata_compress_flag_round_trips_false() {
        let packet = build_metadata_packet("x.bin", 1, false);
        let parsed = parse_and_verify(&packet).expect("valid packet");
        let (_, compress) = parse_metadata_payload(parsed.payload).expect("valid metadata");
        assert!(!compress);
    }

    #[test]
    fn bit_flip_is_detected() {
        let mut packet = build_data_packet(3, 8_096, b"some bytes worth flipping");
        let idx = 10;
        packet[idx] ^= 0x01;
        assert_eq!(
            parse_and_verify(&packet).unwrap_err(),
            ProtocolError::ChecksumMismatch
        );
    }

    #[test]
    fn bit_flip_in_header_is_detected() {
        let mut packet = build_data_packet(3, 8_096, b"payload");
        packet[0] ^= 0x01;
        assert_eq!(
            parse_and_verify(&packet).unwrap_err(),
            ProtocolError::ChecksumMismatch
        );
    }

    #[test]
    fn truncated_packet_is_rejected() {
        let packet = vec![0u8; MIN_PACKET_LEN - 1];
        assert_eq!(
            parse_and_verify(&packet).unwrap_err(),
            ProtocolError::Truncated
        );
    }

    #[test]
    fn end_packet_is_recognized_and_unverified() {
        let packet = build_end_packet();
        assert_eq!(packet.len(), END_PACKET_LEN);
        assert!(is_end_packet(&packet));
        // Not a valid framed packet: too short for a trailer.
        assert!(parse_and_verify(&packet).is_err());
    }

    #[test]
    fn arbitrary_four_byte_buffer_is_not_mistaken_for_end_packet() {
        assert!(!is_end_packet(&1i32.to_le_bytes()));
        assert!(!is_end_packet(&0i32.to_le_bytes()));
    }

    proptest::proptest! {
        #[test]
        fn round_trip_holds_for_arbitrary_payloads(seq in 1i32..=i32::MAX, next in proptest::prelude::any::<u32>(), payload in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..4096)) {
            let packet = build_data_packet(seq, next, &payload);
            let parsed = parse_and_verify(&packet).expect("valid packet");
            proptest::prop_assert_eq!(parsed.seq, seq);
            proptest::prop_assert_eq!(parsed.next_size, next);
            proptest::prop_assert_eq!(parsed.payload, payload.as_slice());
        }
    }
}
