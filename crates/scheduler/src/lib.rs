//! PagePin Scheduler Library
//!
//! Deferred-callback plumbing for the overlay: cancellation tokens and a
//! deterministic timer queue. The overlay's hover state machine schedules
//! its collapse delays, expand-growth completions, and deferred focus calls
//! here instead of relying on animation-completion signals, so transitions
//! are reproducible in tests by driving the clock by hand.
//!
//! # Example
//!
//! ```
//! use pagepin_scheduler::TimerQueue;
//!
//! let mut timers: TimerQueue<&str> = TimerQueue::new();
//!
//! let handle = timers.schedule(0, 250, "collapse");
//!
//! // Nothing fires before the deadline.
//! assert!(timers.fire_due(100).is_empty());
//!
//! // A cancelled timer never fires.
//! timers.cancel(handle.id);
//! assert!(timers.fire_due(300).is_empty());
//! ```

mod cancel;
mod timer;

// Re-export public API
pub use cancel::CancellationToken;
pub use timer::{TimerHandle, TimerId, TimerQueue};
