//! Latest-pose register shared between the network thread and frame consumers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::pose::Pose;

/// Single-slot register holding the most recent pose.
///
/// Clones share the same slot. Writes replace the whole value, so a reader
/// sees either the previous pose or the new one, never a mix. Readers may
/// observe a slightly stale value relative to a concurrent write.
#[derive(Clone, Debug, Default)]
pub struct PoseSink {
    inner: Arc<SinkInner>,
}

#[derive(Debug, Default)]
struct SinkInner {
    latest: Mutex<Option<Pose>>,
    updates: AtomicU64,
}

impl PoseSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored pose.
    pub fn write(&self, pose: Pose) {
        // A panic while holding the lock cannot leave a half-written `Pose`.
        let mut guard = self
            .inner
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Some(pose);
        drop(guard);
        self.inner.updates.fetch_add(1, Ordering::Release);
    }

    /// Most recently written pose, or `None` before the first write.
    #[must_use]
    pub fn read(&self) -> Option<Pose> {
        *self
            .inner
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Most recent pose, or [`Pose::IDENTITY`] before the first write.
    #[must_use]
    pub fn read_or_identity(&self) -> Pose {
        self.read().unwrap_or(Pose::IDENTITY)
    }

    /// Number of writes so far.
    #[must_use]
    pub fn updates(&self) -> u64 {
        self.inner.updates.load(Ordering::Acquire)
    }
}
