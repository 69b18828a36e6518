//! `clap` derive argument definitions for the two binaries.

use std::path::PathBuf;

use clap::Parser;
use protocol::{DEFAULT_TCP_PORT, DEFAULT_UDP_PORT};

use crate::destination::{parse_destination, Destination};

/// Sends a single file to a waiting receiver.
#[derive(Debug, Parser)]
#[command(name = "xfer-send", version, about)]
pub struct SenderArgs {
    /// Path to the local file to send.
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,

    /// Destination address, overridden by a `HOST` in the positional
    /// destination argument when one is given.
    #[arg(short = 'a', long = "address")]
    pub address: Option<String>,

    /// UDP data-channel port.
    #[arg(short = 'u', long = "udp_port", default_value_t = DEFAULT_UDP_PORT)]
    pub udp_port: u16,

    /// TCP control-channel port.
    #[arg(short = 't', long = "tcp_port", default_value_t = DEFAULT_TCP_PORT)]
    pub tcp_port: u16,

    /// Compress each chunk's payload before sending it.
    #[arg(short = 'c', long = "compress")]
    pub compress: bool,

    /// Log per-chunk protocol activity.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// `[USER@]HOST:PATH` or `HOST:PATH`. Overrides `-a` and supplies the
    /// destination path; a trailing unescaped `/` in `PATH` is rejected.
    pub destination: String,
}

impl SenderArgs {
    /// Parses [`SenderArgs::destination`], falling back to
    /// [`SenderArgs::address`] when the positional argument carries no
    /// host component worth overriding it with.
    ///
    /// # Errors
    ///
    /// Returns [`xfer_core::error::XferError::Destination`] if the positional
    /// destination argument is malformed.
    pub fn resolve_destination(&self) -> Result<Destination, xfer_core::error::XferError> {
        parse_destination(&self.destination)
    }
}

/// Waits for one incoming transfer and then exits.
#[derive(Debug, Parser)]
#[command(name = "xfer-recv", version, about)]
pub struct ReceiverArgs {
    /// Address to bind to. Defaults to all interfaces.
    #[arg(short = 'a', long = "address")]
    pub address: Option<String>,

    /// UDP data-channel port.
    #[arg(short = 'u', long = "udp_port", default_value_t = DEFAULT_UDP_PORT)]
    pub udp_port: u16,

    /// TCP control-channel port.
    #[arg(short = 't', long = "tcp_port", default_value_t = DEFAULT_TCP_PORT)]
    pub tcp_port: u16,

    /// Log per-chunk protocol activity.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl ReceiverArgs {
    /// Returns the address to bind to, defaulting to all interfaces.
    #[must_use]
    pub fn bind_address(&self) -> &str {
        self.address.as_deref().unwrap_or("0.0.0.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_args_parse_minimal_invocation() {
        let args = SenderArgs::parse_from([
            "xfer-send",
            "-f",
            "payload.bin",
            "10.0.0.5:outbox/payload.bin",
        ]);
        assert_eq!(args.file, PathBuf::from("payload.bin"));
        assert_eq!(args.udp_port, DEFAULT_UDP_PORT);
        assert_eq!(args.tcp_port, DEFAULT_TCP_PORT);
        assert!(!args.compress);
        let dest = args.resolve_destination().expect("valid destination");
        assert_eq!(dest.host, "10.0.0.5");
    }

    #[test]
    fn sender_args_accepts_compress_and_verbose_flags() {
        let args = SenderArgs::parse_from([
            "xfer-send",
            "-f",
            "payload.bin",
            "-c",
            "-v",
            "10.0.0.5:payload.bin",
        ]);
        assert!(args.compress);
        assert!(args.verbose);
    }

    #[test]
    fn receiver_args_default_bind_address_is_unspecified() {
        let args = ReceiverArgs::parse_from(["xfer-recv"]);
        assert_eq!(args.bind_address(), "0.0.0.0");
        assert_eq!(args.udp_port, DEFAULT_UDP_PORT);
    }

    #[test]
    fn receiver_args_accepts_explicit_bind_address() {
        let args = ReceiverArgs::parse_from(["xfer-recv", "-a", "192.168.1.10"]);
        assert_eq!(args.bind_address(), "192.168.1.10");
    }
}
