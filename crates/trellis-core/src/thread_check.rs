//! UI-thread affinity checks.
//!
//! The widget tree and its layouts are owned by exactly one thread. Touching
//! them from another thread is a precondition violation; it is detected in
//! debug builds by comparing the stored owner [`ThreadId`] against the
//! current thread, and skipped entirely in release builds unless checks are
//! switched on with [`set_thread_checks_enabled`].
//!
//! Background threads hand work to the UI thread through
//! [`TaskSender`](crate::TaskSender) instead of touching the tree.
//!
//! ```
//! use trellis_core::thread_check::ThreadAffinity;
//!
//! let affinity = ThreadAffinity::current();
//! affinity.debug_assert_same_thread();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;

/// Flag to enable/disable affinity checks globally.
static THREAD_CHECKS_ENABLED: AtomicBool = AtomicBool::new(cfg!(debug_assertions));

/// Enable or disable affinity checks.
///
/// Checks default to on in debug builds and off in release builds.
pub fn set_thread_checks_enabled(enabled: bool) {
    THREAD_CHECKS_ENABLED.store(enabled, Ordering::SeqCst);
}

/// Whether affinity checks are currently enabled.
#[inline]
pub fn are_thread_checks_enabled() -> bool {
    THREAD_CHECKS_ENABLED.load(Ordering::Relaxed)
}

/// Records the thread that owns a value and verifies later accesses.
#[derive(Debug, Clone, Copy)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Bind to the current thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// The owning thread.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Whether the current thread is the owner.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Panics if called off the owning thread. Always active.
    #[inline]
    pub fn assert_same_thread(&self) {
        if !self.is_same_thread() {
            self.panic_wrong_thread();
        }
    }

    /// Panics if called off the owning thread while checks are enabled.
    ///
    /// Compiled out of release builds.
    #[inline]
    pub fn debug_assert_same_thread(&self) {
        #[cfg(debug_assertions)]
        if are_thread_checks_enabled() {
            self.assert_same_thread();
        }
    }

    #[cold]
    #[inline(never)]
    fn panic_wrong_thread(&self) -> ! {
        let current = std::thread::current();
        panic!(
            "thread affinity violation: value owned by {:?} accessed from \"{}\" ({:?})",
            self.thread_id,
            current.name().unwrap_or("<unnamed>"),
            current.id(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn test_thread_affinity_same_thread() {
        let affinity = ThreadAffinity::current();
        assert!(affinity.is_same_thread());
        affinity.assert_same_thread();
        affinity.debug_assert_same_thread();
    }

    #[test]
    fn test_thread_affinity_different_thread() {
        let affinity = ThreadAffinity::current();
        let result = Arc::new(AtomicBool::new(false));
        let result_clone = result.clone();

        std::thread::spawn(move || {
            result_clone.store(!affinity.is_same_thread(), Ordering::SeqCst);
        })
        .join()
        .unwrap();

        assert!(result.load(Ordering::SeqCst));
    }

    #[test]
    fn test_thread_affinity_panic_on_wrong_thread() {
        let affinity = ThreadAffinity::current();
        let result = std::thread::spawn(move || affinity.assert_same_thread()).join();
        assert!(result.is_err());
    }

    #[test]
    fn test_thread_checks_enabled_flag() {
        let original = are_thread_checks_enabled();
        set_thread_checks_enabled(true);
        assert!(are_thread_checks_enabled());
        set_thread_checks_enabled(false);
        assert!(!are_thread_checks_enabled());
        set_thread_checks_enabled(original);
    }

    #[test]
    fn test_affinity_copy_keeps_owner() {
        let a = ThreadAffinity::current();
        let b = a;
        assert_eq!(a.thread_id(), b.thread_id());
    }
}
