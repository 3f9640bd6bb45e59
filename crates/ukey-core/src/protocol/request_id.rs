//! Session-owned counter for request correlation ids.
//!
//! Every outbound command carries a `MsgId` that the peer echoes back in
//! its reply; the correlator uses it to route the reply to the waiting
//! caller.  Ids only need to be unique within one session, so the counter
//! lives in the session rather than in process-global state.

use std::sync::atomic::{AtomicU64, Ordering};

/// A thread-safe, monotonically increasing correlation-id counter.
///
/// Ids are decimal strings starting at `"1"`.  The counter wraps around at
/// `u64::MAX` without panicking — after 2^64 requests on one session the
/// ids repeat, which is far beyond any conceivable session lifetime.
///
/// # Examples
///
/// ```rust
/// use ukey_core::RequestIdCounter;
///
/// let counter = RequestIdCounter::new();
/// assert_eq!(counter.next_id(), "1");
/// assert_eq!(counter.next_id(), "2");
/// ```
pub struct RequestIdCounter {
    inner: AtomicU64,
}

impl RequestIdCounter {
    /// Creates a counter whose first issued id is `"1"`.
    pub fn new() -> Self {
        Self {
            inner: AtomicU64::new(0),
        }
    }

    /// Returns the next correlation id.
    ///
    /// `Ordering::Relaxed` is sufficient: the ids are only compared for
    /// equality against reply frames, never used for memory
    /// synchronisation between threads.
    pub fn next_id(&self) -> String {
        let n = self.inner.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        n.to_string()
    }
}

impl Default for RequestIdCounter {
    fn default() -> Self {
        Self::new()
    }
}
