#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! Installs the process-wide `tracing` subscriber both binaries use for
//! diagnostics. There is no custom verbosity flag system here: `tracing`'s
//! own level filtering does the work, scoped by an `EnvFilter` that
//! [`init`] builds from a single `-v/--verbose` boolean.
//!
//! # Design
//!
//! Default (`verbose = false`): `warn` for everything, `info` for
//! user-relevant lifecycle events (metadata accepted, transfer complete).
//! With `-v`: `debug` as well, surfacing the per-packet chatter (ack
//! received, retry N of 20, chunk resized to N bytes) that verbose mode
//! is expected to print.
//!
//! `RUST_LOG` always overrides the computed default, so a developer
//! chasing a specific module can still reach for it without recompiling.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";
const VERBOSE_FILTER: &str = "debug";

/// Installs the global `tracing` subscriber.
///
/// Calling this more than once in the same process is a no-op after the
/// first call; `tracing_subscriber` only allows one global subscriber, and
/// binaries call this exactly once at startup before parsing arguments.
pub fn init(verbose: bool) {
    let directive = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_does_not_panic_when_called_repeatedly() {
        init(false);
        init(true);
    }
}
