#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `core` holds the pieces shared by the sender and receiver binaries that
//! are not specific to the wire protocol or the transfer state machine:
//! the top-level [`error::XferError`] type, the [`exit_code::ExitCode`]
//! taxonomy it maps onto, and [`signal`] handling for a clean shutdown on
//! `SIGINT`/`SIGTERM`.
//!
//! # See also
//!
//! - `protocol` for packet framing and control-channel messages.
//! - `transfer` for the sender/receiver drive loops that produce and
//!   consume [`error::XferError`].

pub mod error;
pub mod exit_code;
pub mod signal;

pub use error::XferError;
pub use exit_code::ExitCode;
