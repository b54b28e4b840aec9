//! Progress signaling around network round trips.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// What a network round trip is doing, for display by a progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressLabel {
    /// Checking the remote revision.
    Probe,
    /// Downloading remote data.
    Download,
    /// Uploading local data.
    Upload,
}

impl fmt::Display for ProgressLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProgressLabel::Probe => "WebDAV: checking remote revision",
            ProgressLabel::Download => "WebDAV: downloading",
            ProgressLabel::Upload => "WebDAV: uploading",
        };
        f.write_str(label)
    }
}

/// Receives begin/end notifications bracketing each network round trip.
///
/// Implementations must tolerate an `end` without a matching `begin`.
pub trait ProgressObserver: Send + Sync {
    /// A round trip started.
    fn begin(&self, label: ProgressLabel);

    /// A round trip finished, successfully or not.
    fn end(&self);
}

/// Scoped progress bracket: `begin` on creation, `end` on drop.
///
/// Dropping runs on every exit path, including `?` propagation, so the
/// observer always sees exactly one `end` per guard.
#[must_use = "progress ends as soon as the guard is dropped"]
pub struct ProgressGuard {
    observer: Arc<dyn ProgressObserver>,
}

impl ProgressGuard {
    /// Signals `begin` and returns a guard that signals `end` when dropped.
    pub fn begin(observer: Arc<dyn ProgressObserver>, label: ProgressLabel) -> Self {
        observer.begin(label);
        Self { observer }
    }
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        self.observer.end();
    }
}

/// A shared counter of in-flight round trips.
///
/// The counter never goes below zero; unmatched `end` calls are ignored.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    in_flight: AtomicUsize,
    begun: AtomicUsize,
    ended: AtomicUsize,
    last_label: Mutex<Option<ProgressLabel>>,
}

impl ProgressCounter {
    /// Creates an idle counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of round trips currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Returns true if any round trip is in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight() > 0
    }

    /// Total `begin` calls seen.
    pub fn begun(&self) -> usize {
        self.begun.load(Ordering::SeqCst)
    }

    /// Total `end` calls seen, including unmatched ones.
    pub fn ended(&self) -> usize {
        self.ended.load(Ordering::SeqCst)
    }

    /// Label of the most recent `begin`.
    pub fn last_label(&self) -> Option<ProgressLabel> {
        *self.last_label.lock()
    }
}

impl ProgressObserver for ProgressCounter {
    fn begin(&self, label: ProgressLabel) {
        self.begun.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        *self.last_label.lock() = Some(label);
    }

    fn end(&self) {
        self.ended.fetch_add(1, Ordering::SeqCst);
        let _ = self
            .in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }
}
