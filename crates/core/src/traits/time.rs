//! Clock abstraction for the blocking, sleep-driven mission sequencer.
//!
//! The sequencer never reads wall-clock time directly. Every settle delay,
//! poll interval and timeout goes through [`Clock`], so host tests can run a
//! full mission in virtual time with [`MockClock`].

use core::cell::Cell;
use core::time::Duration;

/// Monotonic time source that can also block the caller.
///
/// - `SystemClock` (in the host crate) uses `std::time::Instant` and
///   `std::thread::sleep`
/// - [`MockClock`] advances virtual time instead of sleeping
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use offboard_pilot_core::traits::{Clock, MockClock};
///
/// fn settle<C: Clock>(clock: &C) -> u64 {
///     let start = clock.now_us();
///     clock.sleep(Duration::from_millis(400));
///     clock.elapsed_since(start)
/// }
///
/// let clock = MockClock::new();
/// assert_eq!(settle(&clock), 400_000);
/// ```
pub trait Clock {
    /// Returns current time in microseconds since an arbitrary epoch.
    fn now_us(&self) -> u64;

    /// Blocks the caller for `duration`.
    fn sleep(&self, duration: Duration);

    /// Returns current time in milliseconds.
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }

    /// Returns elapsed microseconds since a reference point.
    ///
    /// Uses saturating subtraction to handle a reference in the future.
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Virtual clock for deterministic tests.
///
/// `sleep` returns immediately after advancing the virtual time, and records
/// how many times it was called. Share it between the sequencer and fake
/// gateways by reference.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use offboard_pilot_core::traits::{Clock, MockClock};
///
/// let clock = MockClock::new();
/// clock.sleep(Duration::from_secs(1));
/// assert_eq!(clock.now_ms(), 1000);
/// assert_eq!(clock.sleep_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockClock {
    current_us: Cell<u64>,
    sleeps: Cell<u32>,
}

impl MockClock {
    /// Creates a new `MockClock` starting at time 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `MockClock` starting at the specified time.
    pub fn with_initial(us: u64) -> Self {
        Self {
            current_us: Cell::new(us),
            sleeps: Cell::new(0),
        }
    }

    /// Sets the current time to an absolute value.
    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }

    /// Advances the current time without counting a sleep.
    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get() + us);
    }

    /// Number of `sleep` calls so far.
    pub fn sleep_count(&self) -> u32 {
        self.sleeps.get()
    }
}

impl Clock for MockClock {
    fn now_us(&self) -> u64 {
        self.current_us.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration.as_micros() as u64);
        self.sleeps.set(self.sleeps.get() + 1);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
