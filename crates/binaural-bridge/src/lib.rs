//! State shared between the foreground parameter loop and the audio callback.
//!
//! This crate defines the types that cross the boundary between the two
//! execution contexts of a playback session:
//! - The foreground loop reads listener geometry, solves it and publishes
//!   fresh [`AcousticParameters`] through [`SharedParameters`].
//! - The audio callback loads one parameter snapshot per invocation and
//!   reports how much input is left through [`PlaybackProgress`].
//!
//! Neither side ever blocks the other. Parameters are swapped as a whole
//! immutable snapshot, so the callback always sees a delay and a balance
//! that were computed together.

pub mod config;
pub mod geometry;

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use arc_swap::ArcSwap;

pub use crate::geometry::{AcousticParameters, ListenerGeometry};

/// Lock-free cell holding the current [`AcousticParameters`] snapshot.
///
/// Writers replace the whole snapshot with [`SharedParameters::publish`];
/// readers copy it out with [`SharedParameters::snapshot`]. Both operations
/// are wait-free for readers and never allocate on the reading side, which
/// makes `snapshot` safe to call from a real-time audio thread.
#[derive(Debug)]
pub struct SharedParameters {
    current: ArcSwap<AcousticParameters>,
}

impl SharedParameters {
    /// Creates a cell initialised with `initial`.
    pub fn new(initial: AcousticParameters) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// Atomically replaces the current snapshot.
    ///
    /// This allocates, so it must only be called from the foreground loop.
    pub fn publish(&self, parameters: AcousticParameters) {
        self.current.store(Arc::new(parameters));
    }

    /// Returns a copy of the most recently published snapshot.
    #[inline]
    pub fn snapshot(&self) -> AcousticParameters {
        **self.current.load()
    }
}

impl Default for SharedParameters {
    fn default() -> Self {
        Self::new(AcousticParameters::default())
    }
}

/// Remaining-input counter written by the audio callback.
///
/// The callback owns the source buffer exclusively; this counter is the only
/// view the foreground loop has of how far playback got.
#[derive(Debug)]
pub struct PlaybackProgress {
    remaining_bytes: AtomicUsize,
}

impl PlaybackProgress {
    pub fn new(remaining_bytes: usize) -> Self {
        Self {
            remaining_bytes: AtomicUsize::new(remaining_bytes),
        }
    }

    /// Stores the number of source bytes that have not been consumed yet.
    #[inline]
    pub fn update(&self, remaining_bytes: usize) {
        self.remaining_bytes.store(remaining_bytes, Ordering::Release);
    }

    pub fn remaining_bytes(&self) -> usize {
        self.remaining_bytes.load(Ordering::Acquire)
    }

    /// Whether the callback has consumed every byte of the source.
    pub fn is_finished(&self) -> bool {
        self.remaining_bytes() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn snapshot_returns_last_published_pair() {
        let shared = SharedParameters::default();
        assert_eq!(shared.snapshot(), AcousticParameters::default());

        let parameters = AcousticParameters {
            delay_frames: -12,
            balance: 1.25,
        };
        shared.publish(parameters);
        assert_eq!(shared.snapshot(), parameters);
    }

    #[test]
    fn concurrent_readers_never_observe_a_mixed_pair() {
        // every published pair satisfies balance == delay_frames, so a torn
        // read would show up as a mismatch
        let shared = Arc::new(SharedParameters::new(AcousticParameters {
            delay_frames: 0,
            balance: 0.0,
        }));

        let reader = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    let snapshot = shared.snapshot();
                    assert_eq!(snapshot.balance, snapshot.delay_frames as f32);
                }
            })
        };

        for value in 0..10_000 {
            shared.publish(AcousticParameters {
                delay_frames: value,
                balance: value as f32,
            });
        }
        reader.join().expect("reader thread panicked");
    }

    #[test]
    fn progress_reports_finished_at_zero() {
        let progress = PlaybackProgress::new(8);
        assert!(!progress.is_finished());
        progress.update(4);
        assert_eq!(progress.remaining_bytes(), 4);
        progress.update(0);
        assert!(progress.is_finished());
    }
}
