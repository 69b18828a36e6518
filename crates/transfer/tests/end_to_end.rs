//! Drives a real sender and receiver against each other over loopback
//! sockets.

use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use cli::{ReceiverArgs, SenderArgs};

fn run_pair(udp_port: u16, tcp_port: u16, compress: bool, payload: &[u8]) -> Vec<u8> {
    let src_dir = tempfile::tempdir().expect("create source tempdir");
    let dst_dir = tempfile::tempdir().expect("create destination tempdir");

    let src_path = src_dir.path().join("payload.bin");
    std::fs::File::create(&src_path)
        .expect("create source file")
        .write_all(payload)
        .expect("write source payload");

    let dst_path = dst_dir.path().join("received.bin");
    let dst_path_str = dst_path.to_str().expect("destination path is utf-8").to_string();

    let receiver_args = ReceiverArgs {
        address: Some("127.0.0.1".to_string()),
        udp_port,
        tcp_port,
        verbose: false,
    };

    let receiver = thread::spawn(move || {
        transfer::run_receiver(&receiver_args).expect("receiver completes without error");
    });

    thread::sleep(Duration::from_millis(150));

    let sender_args = SenderArgs {
        file: src_path,
        address: None,
        udp_port,
        tcp_port,
        compress,
        verbose: false,
        destination: format!("127.0.0.1:{dst_path_str}"),
    };
    transfer::run_sender(&sender_args).expect("sender completes without error");

    receiver.join().expect("receiver thread joins");
    std::fs::read(PathBuf::from(dst_path_str)).expect("read destination file")
}

#[test]
fn small_file_transfers_uncompressed() {
    let payload = b"a short payload that fits in a single chunk".to_vec();
    let received = run_pair(34101, 34102, false, &payload);
    assert_eq!(received, payload);
}

#[test]
fn multi_chunk_file_transfers_with_compression() {
    let payload: Vec<u8> = (0..protocol::MIN_CHUNK as usize * 3)
        .map(|i| (i % 251) as u8)
        .collect();
    let received = run_pair(34103, 34104, true, &payload);
    assert_eq!(received, payload);
}

#[test]
fn empty_file_transfers_as_a_zero_length_destination() {
    let received = run_pair(34105, 34106, false, &[]);
    assert!(received.is_empty());
}
