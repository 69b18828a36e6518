//! Receiver state machine: accepts one sender's metadata handshake, writes
//! its chunks to the destination file, and handles the incremental-mode
//! probe sub-exchange.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::net::{SocketAddr, TcpListener, UdpSocket};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use checksums::murmur32;
use cli::ReceiverArgs;
use compress::decompress_chunk;
use core::error::XferError;
use core::signal::{install_signal_handlers, SignalHandler};
use protocol::{
    is_end_packet, parse_and_verify, parse_incremental_probe, parse_metadata_payload,
    ControlMessage, DECOMPRESSION_EXPANSION_CAP,
};
use tracing::{debug, info, warn};

use crate::control::ControlChannel;

/// Runs the receiver: waits for one sender, accepts its file, and exits.
///
/// # Errors
///
/// Returns [`XferError`] on any usage, I/O, or protocol failure. Individual
/// chunk checksum or decompression failures are reported back to the
/// sender over the control channel rather than being fatal here; only a
/// malformed metadata handshake, a destination path error, or an I/O
/// failure on the receiver's own filesystem is fatal.
pub fn run_receiver(args: &ReceiverArgs) -> Result<(), XferError> {
    let signals = install_signal_handlers()?;
    let udp = UdpSocket::bind((args.bind_address(), args.udp_port))?;
    udp.set_read_timeout(Some(Duration::from_secs(1)))?;
    let tcp_listener = TcpListener::bind((args.bind_address(), args.tcp_port))?;

    info!(
        udp = args.udp_port,
        tcp = args.tcp_port,
        "waiting for a sender"
    );

    let (tcp_stream, peer) = tcp_listener.accept()?;
    let mut control = ControlChannel::new(tcp_stream)?;
    info!(%peer, "accepted control connection");

    let mut datagram = vec![0u8; protocol::MIN_CHUNK as usize + 1024];
    let Some((dest_path, compress, mut file, mut incremental, mut window_len)) =
        receive_metadata(&udp, &mut control, &mut datagram, &signals)?
    else {
        info!("signal received before a sender's metadata arrived, closing sockets and exiting");
        return Ok(());
    };

    // Retransmitted chunks (the sender's ack never arrived) must not be
    // written twice; only their ack needs resending.
    let mut accepted_seqs: HashSet<i32> = HashSet::new();

    loop {
        if signals.is_shutdown_requested() {
            info!(
                reason = ?signals.shutdown_reason(),
                path = %dest_path.display(),
                "signal received, closing sockets and exiting"
            );
            return Ok(());
        }

        let Some(len) = recv_timeout(&udp, &mut datagram)? else {
            continue;
        };
        let packet = &datagram[..len];

        if is_end_packet(packet) {
            info!(path = %dest_path.display(), "transfer complete");
            return Ok(());
        }

        if let Some(crc) = parse_incremental_probe(packet) {
            if incremental {
                let outcome = check_incremental_window(&mut file, crc, window_len as usize)?;
                match outcome {
                    IncrementalWindowOutcome::Matches => {
                        control.send(&ControlMessage::Not)?;
                    }
                    IncrementalWindowOutcome::NoFile => {
                        incremental = false;
                        control.send(&ControlMessage::NewFile)?;
                    }
                    IncrementalWindowOutcome::Differs => {
                        control.send(&ControlMessage::Send)?;
                    }
                }
            } else {
                // The destination was new from the start (or incremental
                // mode has already ended); there is nothing to compare
                // against, so every probe gets the same answer a fresh
                // destination would.
                control.send(&ControlMessage::NewFile)?;
            }
            continue;
        }
        // Not a probe: the receiver asked for this chunk's actual bytes
        // last round (a `Differs` or `NewFile` verdict), so it falls
        // through to the normal data-packet path below. Incremental mode
        // itself only ends on an explicit `NewFile` verdict above.

        let parsed = match parse_and_verify(packet) {
            Ok(parsed) => parsed,
            Err(_) => {
                control.send(&ControlMessage::IncorrectCrc)?;
                continue;
            }
        };

        if accepted_seqs.contains(&parsed.seq) {
            debug!(seq = parsed.seq, "duplicate chunk, ack was likely lost");
            control.send(&ControlMessage::Ack(parsed.seq))?;
            continue;
        }

        let payload = if compress {
            match decompress_chunk(parsed.payload, DECOMPRESSION_EXPANSION_CAP) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(seq = parsed.seq, %err, "decompression failed");
                    control.send(&ControlMessage::FailedDecompression)?;
                    continue;
                }
            }
        } else {
            parsed.payload.to_vec()
        };

        file.write_all(&payload)?;
        accepted_seqs.insert(parsed.seq);
        debug!(seq = parsed.seq, bytes = payload.len(), "chunk written");
        control.send(&ControlMessage::Ack(parsed.seq))?;

        window_len = parsed.next_size;
        let next_len = parsed.next_size as usize + 1024;
        if datagram.len() < next_len {
            datagram.resize(next_len, 0);
        }
    }
}

enum IncrementalWindowOutcome {
    /// The file has no bytes at the current window; fall back to a plain
    /// transfer starting at this chunk.
    NoFile,
    Matches,
    Differs,
}

/// Compares the next unread window of an existing destination file's
/// content against the sender's reported checksum, without disturbing the
/// file's write position used once incremental mode ends.
///
/// `window_len` must equal the sender's current chunk size (tracked from
/// the metadata packet's `chunk_size_hint` and, once transfers begin, the
/// data packets' `next_size` field) — comparing against any other window
/// size hashes different bytes than the sender's probe did, so a position
/// that actually matches would be reported as differing.
fn check_incremental_window(
    file: &mut File,
    crc: u32,
    window_len: usize,
) -> Result<IncrementalWindowOutcome, XferError> {
    let position = file.stream_position()?;
    let mut window = vec![0u8; window_len];
    let read = file.read(&mut window)?;
    file.seek(SeekFrom::Start(position))?;

    if read == 0 {
        return Ok(IncrementalWindowOutcome::NoFile);
    }
    window.truncate(read);
    if murmur32(&window) == crc {
        file.seek(SeekFrom::Start(position + read as u64))?;
        Ok(IncrementalWindowOutcome::Matches)
    } else {
        Ok(IncrementalWindowOutcome::Differs)
    }
}

/// Reads the next datagram on `udp`, treating the read-timeout set on the
/// socket as "nothing arrived yet" rather than an error so the caller can
/// re-check its signal-shutdown flag between polls.
fn recv_timeout(udp: &UdpSocket, buf: &mut [u8]) -> Result<Option<usize>, XferError> {
    match udp.recv(buf) {
        Ok(len) => Ok(Some(len)),
        Err(err) if matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
            Ok(None)
        }
        Err(err) => Err(XferError::from(err)),
    }
}

/// As [`recv_timeout`], but for the unconnected metadata wait where the
/// sender's address is not yet known.
fn recv_from_timeout(
    udp: &UdpSocket,
    buf: &mut [u8],
) -> Result<Option<(usize, SocketAddr)>, XferError> {
    match udp.recv_from(buf) {
        Ok(result) => Ok(Some(result)),
        Err(err) if matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
            Ok(None)
        }
        Err(err) => Err(XferError::from(err)),
    }
}

/// Repeatedly receives the metadata datagram until a well-formed one
/// arrives, opens (or creates) the destination file, and reports the
/// outcome back to the sender. Returns `None` if a shutdown signal arrives
/// before any sender does.
fn receive_metadata(
    udp: &UdpSocket,
    control: &mut ControlChannel,
    scratch: &mut [u8],
    signals: &SignalHandler,
) -> Result<Option<(PathBuf, bool, File, bool, u32)>, XferError> {
    let mut connected = false;
    loop {
        if signals.is_shutdown_requested() {
            return Ok(None);
        }
        let len = if connected {
            match recv_timeout(udp, scratch)? {
                Some(len) => len,
                None => continue,
            }
        } else {
            match recv_from_timeout(udp, scratch)? {
                Some((len, sender_addr)) => {
                    udp.connect(sender_addr)?;
                    connected = true;
                    info!(peer = %sender_addr, "learned sender's data channel address");
                    len
                }
                None => continue,
            }
        };
        let packet = &scratch[..len];
        let parsed = match parse_and_verify(packet) {
            Ok(parsed) if parsed.seq == protocol::METADATA_SEQ => parsed,
            Ok(_) => continue,
            Err(_) => {
                control.send(&ControlMessage::IncorrectCrc)?;
                continue;
            }
        };

        let (path_str, compress) = match parse_metadata_payload(parsed.payload) {
            Ok(decoded) => decoded,
            Err(_) => {
                control.send(&ControlMessage::IncorrectCrc)?;
                continue;
            }
        };

        let dest_path = PathBuf::from(path_str);
        if dest_path.components().any(|c| c == Component::ParentDir) {
            control.send(&ControlMessage::PathError(format!(
                "destination path {path_str} must not contain .. components"
            )))?;
            continue;
        }
        if let Some(parent) = dest_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                let missing = parent
                    .components()
                    .next_back()
                    .map_or_else(|| parent.display().to_string(), |c| c.as_os_str().to_string_lossy().into_owned());
                control.send(&ControlMessage::PathError(missing))?;
                continue;
            }
        }

        let existed = dest_path.exists();
        let file = open_destination(&dest_path)?;
        control.send(&ControlMessage::Ack(0))?;
        return Ok(Some((dest_path, compress, file, existed, parsed.next_size)));
    }
}

fn open_destination(path: &Path) -> Result<File, XferError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(XferError::from)
}
