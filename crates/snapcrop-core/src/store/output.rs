//! Scoped handles to encoded export buffers.
//!
//! Every handle issued by a store is counted; dropping the handle releases
//! it. The count is how callers (and tests) check that overwritten or
//! invalidated results really went away.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Issues [`OutputHandle`]s and counts the live ones.
#[derive(Debug, Clone, Default)]
pub(crate) struct HandleTracker {
    live: Arc<AtomicUsize>,
}

impl HandleTracker {
    pub(crate) fn issue(&self, bytes: Arc<[u8]>) -> OutputHandle {
        self.live.fetch_add(1, Ordering::SeqCst);
        OutputHandle {
            bytes,
            live: Arc::clone(&self.live),
        }
    }

    pub(crate) fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// A live reference to one record's encoded output.
///
/// Not `Clone`: exactly one owner, released on drop. Use [`shared`] to
/// hand the bytes to a consumer that outlives the handle.
///
/// [`shared`]: OutputHandle::shared
pub struct OutputHandle {
    bytes: Arc<[u8]>,
    live: Arc<AtomicUsize>,
}

impl OutputHandle {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The underlying buffer, without extending the handle's lifetime.
    pub fn shared(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }
}

impl Drop for OutputHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl fmt::Debug for OutputHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputHandle")
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_drop_updates_count() {
        let tracker = HandleTracker::default();
        assert_eq!(tracker.live(), 0);

        let a = tracker.issue(Arc::from(vec![1u8, 2, 3]));
        let b = tracker.issue(Arc::from(Vec::<u8>::new()));
        assert_eq!(tracker.live(), 2);
        assert_eq!(a.bytes(), &[1, 2, 3]);
        assert!(b.is_empty());

        drop(a);
        assert_eq!(tracker.live(), 1);
        drop(b);
        assert_eq!(tracker.live(), 0);
    }

    #[test]
    fn test_shared_bytes_outlive_handle() {
        let tracker = HandleTracker::default();
        let handle = tracker.issue(Arc::from(vec![9u8; 4]));
        let shared = handle.shared();
        drop(handle);

        assert_eq!(tracker.live(), 0);
        assert_eq!(&*shared, &[9, 9, 9, 9]);
    }

    #[test]
    fn test_cloned_tracker_shares_count() {
        let tracker = HandleTracker::default();
        let other = tracker.clone();
        let _handle = other.issue(Arc::from(vec![0u8]));
        assert_eq!(tracker.live(), 1);
    }
}
