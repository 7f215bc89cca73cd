//! In-process run lease.
//!
//! At most one run per process. Cross-process exclusion rests on the
//! unique `videos.video_id` constraint.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Shared lease handle.
#[derive(Debug, Clone, Default)]
pub struct RunLease {
    inner: Arc<Mutex<()>>,
}

/// Held for the duration of a run; released on drop.
#[derive(Debug)]
pub struct RunGuard {
    _guard: OwnedMutexGuard<()>,
}

impl RunLease {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lease, or `None` if a run is already in flight.
    pub fn try_acquire(&self) -> Option<RunGuard> {
        Arc::clone(&self.inner)
            .try_lock_owned()
            .ok()
            .map(|guard| RunGuard { _guard: guard })
    }

    pub fn is_held(&self) -> bool {
        self.inner.try_lock().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_refused_until_release() {
        let lease = RunLease::new();

        let guard = lease.try_acquire().expect("first acquire");
        assert!(lease.is_held());
        assert!(lease.clone().try_acquire().is_none());

        drop(guard);
        assert!(!lease.is_held());
        assert!(lease.try_acquire().is_some());
    }
}
