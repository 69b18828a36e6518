#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Overview
//!
//! `transfer` drives the protocol end to end: [`sender::run_sender`] streams
//! a file over UDP with a TCP control channel for acknowledgements and
//! retries, and [`receiver::run_receiver`] is its counterpart. Chunk sizing
//! ([`chunker`]) and the control-channel wire glue ([`control`]) are shared
//! between both directions.

pub mod chunker;
pub mod control;
pub mod receiver;
pub mod sender;

pub use chunker::ChunkSizer;
pub use control::ControlChannel;
pub use receiver::run_receiver;
pub use sender::run_sender;
