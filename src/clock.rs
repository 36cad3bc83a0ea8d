//! # Clock Collaborator
//!
//! The scheduler never reads a hardware timer directly. It is handed a
//! [`Clock`] implementation by the host on every call to
//! [`crate::scheduler::Scheduler::execute`], which keeps the selection
//! policy in `scheduler.rs` free of any dependency on a particular timer
//! peripheral and trivially testable on the host with a simulated clock.
//!
//! All timestamps are 32-bit microsecond counters and are assumed to wrap
//! around roughly every 71 minutes. Comparisons that need to tolerate wrap
//! use a signed 32-bit difference (see `scheduler::Scheduler::execute`);
//! callers must not otherwise rely on `now()` being monotonic across a wrap.

/// A monotonically increasing microsecond counter.
///
/// `now()` is called at least four times per scheduling pass plus twice per
/// dispatch, so implementations should be cheap — typically a single
/// peripheral register read or a free-running cycle-counter conversion.
pub trait Clock {
    /// Returns the current time in microseconds since an arbitrary epoch.
    fn now(&self) -> u32;
}

impl<F: Fn() -> u32> Clock for F {
    fn now(&self) -> u32 {
        self()
    }
}
