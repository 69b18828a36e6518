//! Dynamic chunk-size adapter.
//!
//! # Design
//!
//! `C' = clamp(C · (1 + α · S / 1000) · max(0.1, 1 − β · T), MIN_CHUNK, MAX_CHUNK)`
//!
//! where `S` is the previous chunk's observed throughput in KiB/s and `T`
//! is its observed send duration in seconds. The sizer only tracks the
//! current chunk size; the caller supplies the timing measurement for each
//! chunk as it completes.

use std::time::Duration;

use protocol::{CHUNK_SIZE_ALPHA, CHUNK_SIZE_BETA, MAX_CHUNK, MIN_CHUNK};

/// Tracks the current chunk size and recomputes it after each acked chunk.
#[derive(Debug, Clone, Copy)]
pub struct ChunkSizer {
    current: u32,
}

impl ChunkSizer {
    /// Creates a sizer starting at the smallest chunk size.
    #[must_use]
    pub const fn new() -> Self {
        Self { current: MIN_CHUNK }
    }

    /// Returns the chunk size to use right now.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Recomputes the chunk size from the most recently sent-and-acked
    /// chunk's observed throughput and duration, clamped to
    /// `[MIN_CHUNK, MAX_CHUNK]`.
    pub fn advance(&mut self, bytes_sent: usize, duration: Duration) -> u32 {
        let seconds = duration.as_secs_f64().max(f64::EPSILON);
        let throughput_kib_s = (bytes_sent as f64 / 1024.0) / seconds;
        let growth = 1.0 + CHUNK_SIZE_ALPHA * throughput_kib_s / 1000.0;
        let congestion = (1.0 - CHUNK_SIZE_BETA * seconds).max(0.1);
        let next = f64::from(self.current) * growth * congestion;
        let clamped = next.clamp(f64::from(MIN_CHUNK), f64::from(MAX_CHUNK));
        self.current = clamped.round() as u32;
        self.current
    }
}

impl Default for ChunkSizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_minimum_chunk() {
        assert_eq!(ChunkSizer::new().current(), MIN_CHUNK);
    }

    #[test]
    fn fast_short_chunk_grows_size() {
        let mut sizer = ChunkSizer::new();
        let next = sizer.advance(MIN_CHUNK as usize, Duration::from_millis(1));
        assert!(next >= MIN_CHUNK);
    }

    #[test]
    fn slow_long_chunk_shrinks_toward_minimum() {
        let mut sizer = ChunkSizer::new();
        sizer.advance(MIN_CHUNK as usize, Duration::from_millis(1));
        let shrunk = sizer.advance(100, Duration::from_secs(5));
        assert!(shrunk >= MIN_CHUNK);
        assert!(shrunk <= MAX_CHUNK);
    }

    #[test]
    fn result_never_exceeds_bounds() {
        let mut sizer = ChunkSizer::new();
        for _ in 0..50 {
            let next = sizer.advance(MAX_CHUNK as usize, Duration::from_nanos(1));
            assert!((MIN_CHUNK..=MAX_CHUNK).contains(&next));
        }
    }

    #[test]
    fn zero_duration_does_not_panic_or_divide_by_zero() {
        let mut sizer = ChunkSizer::new();
        let next = sizer.advance(1024, Duration::ZERO);
        assert!((MIN_CHUNK..=MAX_CHUNK).contains(&next));
    }
}
