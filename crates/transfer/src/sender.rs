//! Sender state machine: reads the source file, frames each chunk, and
//! drives the retry/backoff loop against the receiver's control-channel
//! acknowledgements.

use std::fs::File;
use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs, UdpSocket};
use std::thread;
use std::time::{Duration, Instant};

use checksums::murmur32;
use cli::SenderArgs;
use compress::compress_chunk;
use core::error::XferError;
use core::signal::install_signal_handlers;
use protocol::{
    build_data_packet, build_end_packet, build_incremental_probe, build_metadata_packet,
    ControlMessage, CONNECT_TIMEOUT, MAX_RETRIES, METADATA_IMMEDIATE_RETRIES, RETRY_BACKOFF,
};
use tracing::{debug, info, warn};

use crate::chunker::ChunkSizer;
use crate::control::ControlChannel;

/// Outcome of a single incremental-mode probe exchange.
enum IncrementalOutcome {
    /// The receiver already holds this chunk; skip sending it.
    Skip,
    /// The receiver's destination file does not exist; incremental mode
    /// ends, but this chunk is still sent.
    NewFile,
    /// The receiver wants this chunk.
    Send,
}

/// Runs the sender end to end: connects both channels, sends metadata,
/// streams the file, and sends the end-of-transfer marker.
///
/// # Errors
///
/// Returns [`XferError`] on any usage, I/O, protocol, or retry-budget
/// failure. The sender never partially recovers from one of these; every
/// error is fatal to the transfer.
pub fn run_sender(args: &SenderArgs) -> Result<(), XferError> {
    let signals = install_signal_handlers()?;
    let destination = args.resolve_destination()?;

    let mut file = File::open(&args.file).map_err(|source| {
        XferError::Usage(format!(
            "source file {} not found: {source}",
            args.file.display()
        ))
    })?;
    let total_size = file.metadata()?.len();

    let udp = UdpSocket::bind("0.0.0.0:0")?;
    udp.connect((destination.host.as_str(), args.udp_port))?;

    let tcp = connect_with_timeout(&destination.host, args.tcp_port)?;
    let mut control = ControlChannel::new(tcp)?;

    info!(
        file = %args.file.display(),
        host = %destination.host,
        size = total_size,
        "starting transfer"
    );

    let mut sizer = ChunkSizer::new();
    send_metadata(&udp, &mut control, &destination.path, sizer.current(), args.compress)?;

    let mut seq: i32 = 1;
    let mut position: u64 = 0;
    let mut incremental = true;
    // The size used to read *this* round's chunk; carried over from the
    // `next_size` most recently announced to the receiver (or the metadata
    // hint for the very first round), so both sides always agree on the
    // window a probe's checksum was computed over.
    let mut read_size = sizer.current();
    // The (bytes, duration) of the last chunk actually put on the wire,
    // used to compute the *next* round's announced size. `None` until the
    // first real send: a skipped (already-matching) chunk carries no
    // timing signal, so it neither changes `read_size` nor this value.
    let mut last_send: Option<(usize, Duration)> = None;
    let mut buffer = vec![0u8; read_size as usize];

    while position < total_size {
        if signals.is_shutdown_requested() {
            info!(
                reason = ?signals.shutdown_reason(),
                bytes_sent = position,
                "signal received, closing sockets and exiting"
            );
            return Ok(());
        }

        let remaining = total_size - position;
        let take = usize::try_from(remaining.min(u64::from(read_size))).unwrap_or(usize::MAX);
        buffer.resize(take, 0);
        file.read_exact(&mut buffer)?;

        if incremental {
            match incremental_probe(&udp, &mut control, &buffer)? {
                IncrementalOutcome::Skip => {
                    position += take as u64;
                    debug!(seq, bytes = take, "receiver already holds this chunk");
                    continue;
                }
                IncrementalOutcome::NewFile => {
                    incremental = false;
                    debug!("receiver has no existing destination, leaving incremental mode");
                }
                IncrementalOutcome::Send => {}
            }
        }

        let wire_payload = if args.compress {
            compress_chunk(&buffer, take)
                .map_err(|err| XferError::Protocol(format!("compression failed: {err}")))?
        } else {
            buffer.clone()
        };

        // Forward-looking: this is the size the *next* round will read and
        // the receiver will expect, derived from the last chunk actually
        // sent (its throughput is already known, unlike this round's,
        // which is still in flight).
        let next_size_hint = match last_send {
            Some((bytes, duration)) => sizer.advance(bytes, duration),
            None => sizer.current(),
        };
        let started = Instant::now();
        send_chunk_with_retries(&udp, &mut control, seq, next_size_hint, &wire_payload)?;
        let elapsed = started.elapsed();

        position += take as u64;
        debug!(seq, bytes = take, ?elapsed, "chunk acknowledged");
        seq += 1;
        last_send = Some((take, elapsed));
        read_size = next_size_hint;
    }

    udp.send(&build_end_packet())?;
    info!(bytes = total_size, "transfer complete");
    Ok(())
}

fn connect_with_timeout(host: &str, port: u16) -> Result<TcpStream, XferError> {
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|source| XferError::Usage(format!("cannot resolve {host}:{port}: {source}")))?
        .next()
        .ok_or_else(|| XferError::Usage(format!("{host}:{port} did not resolve to an address")))?;
    TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).map_err(XferError::from)
}

fn send_metadata(
    udp: &UdpSocket,
    control: &mut ControlChannel,
    dest_path: &str,
    chunk_hint: u32,
    compress: bool,
) -> Result<(), XferError> {
    let packet = build_metadata_packet(dest_path, chunk_hint, compress);
    let mut immediate_retries = 0u32;
    for attempt in 0..MAX_RETRIES {
        udp.send(&packet)?;
        match control.recv()? {
            Some(ControlMessage::Ack(0)) => return Ok(()),
            Some(ControlMessage::IncorrectCrc) => {
                immediate_retries += 1;
                if immediate_retries > METADATA_IMMEDIATE_RETRIES {
                    return Err(XferError::Checksum {
                        seq: 0,
                        retries: immediate_retries,
                    });
                }
            }
            Some(ControlMessage::PathError(name)) => {
                return Err(XferError::Destination {
                    component: name.clone(),
                    reason: format!("the folder \"{name}\" does not exist"),
                });
            }
            Some(other) => warn!(?other, "unexpected reply while sending metadata"),
            None => warn!(attempt, "control channel timed out awaiting metadata ack"),
        }
        thread::sleep(RETRY_BACKOFF);
    }
    Err(XferError::Timeout)
}

fn incremental_probe(
    udp: &UdpSocket,
    control: &mut ControlChannel,
    payload: &[u8],
) -> Result<IncrementalOutcome, XferError> {
    let crc = murmur32(payload);
    let probe = build_incremental_probe(crc);
    for attempt in 0..MAX_RETRIES {
        udp.send(&probe)?;
        match control.recv()? {
            Some(ControlMessage::Not) => return Ok(IncrementalOutcome::Skip),
            Some(ControlMessage::NewFile) => return Ok(IncrementalOutcome::NewFile),
            Some(ControlMessage::Send | ControlMessage::Ack(_)) => {
                return Ok(IncrementalOutcome::Send)
            }
            Some(other) => warn!(?other, "unexpected reply to incremental probe"),
            None => warn!(attempt, "control channel timed out awaiting incremental reply"),
        }
        thread::sleep(RETRY_BACKOFF);
    }
    Err(XferError::Timeout)
}

fn send_chunk_with_retries(
    udp: &UdpSocket,
    control: &mut ControlChannel,
    seq: i32,
    next_size_hint: u32,
    payload: &[u8],
) -> Result<(), XferError> {
    let packet = build_data_packet(seq, next_size_hint, payload);
    let mut last_failure_was_decompression = false;
    for attempt in 0..MAX_RETRIES {
        udp.send(&packet)?;
        match control.recv()? {
            Some(ControlMessage::Ack(acked)) if acked == seq => return Ok(()),
            Some(ControlMessage::IncorrectCrc) => {
                last_failure_was_decompression = false;
                warn!(seq, attempt, "receiver reported a checksum mismatch, resending");
            }
            Some(ControlMessage::FailedDecompression) => {
                last_failure_was_decompression = true;
                warn!(seq, attempt, "receiver failed to decompress, resending");
            }
            Some(other) => warn!(seq, ?other, "unexpected reply while awaiting chunk ack"),
            None => warn!(seq, attempt, "control channel timed out awaiting chunk ack"),
        }
        thread::sleep(RETRY_BACKOFF);
    }
    if last_failure_was_decompression {
        Err(XferError::Decompression {
            seq,
            retries: MAX_RETRIES,
        })
    } else {
        Err(XferError::Checksum {
            seq,
            retries: MAX_RETRIES,
        })
    }
}
