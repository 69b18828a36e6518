#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` parses the sender and receiver binaries' command-line arguments
//! with `clap`'s derive API ([`args::SenderArgs`], [`args::ReceiverArgs`])
//! and validates the sender's positional `[USER@]HOST:PATH` destination
//! ([`destination`]).
//!
//! # Examples
//!
//! ```
//! use cli::args::SenderArgs;
//! use clap::Parser;
//!
//! let args = SenderArgs::parse_from([
//!     "xfer-send", "-f", "payload.bin", "-c", "10.0.0.5:outbox/payload.bin",
//! ]);
//! assert!(args.compress);
//! let destination = args.resolve_destination().expect("valid destination");
//! assert_eq!(destination.host, "10.0.0.5");
//! ```

pub mod args;
pub mod destination;

pub use args::{ReceiverArgs, SenderArgs};
pub use destination::{parse_destination, Destination};
