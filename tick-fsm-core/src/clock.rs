//! # Clock Abstraction
//!
//! Provides the platform-neutral millisecond time source the machine uses to stamp state
//! entry and to answer elapsed-time queries. Boards plug in their tick counter, host
//! builds can use [`StdClock`], and tests drive a [`ManualClock`] by hand.

use core::cell::Cell;

/// Monotonic millisecond time source.
///
/// # Requirements
///
/// - **Monotonic**: Time values must never go backwards
/// - **Millisecond precision**: Values represent milliseconds since an arbitrary epoch
/// - **Overflow handling**: Elapsed times are computed with wrapping subtraction, so a
///   counter that wraps (like Arduino's `millis()`) still yields correct short intervals
///
/// # Example Implementation
///
/// ```rust,ignore
/// struct SysTick;
///
/// impl Clock for SysTick {
///     fn now_ms(&self) -> u64 {
///         // Platform-specific tick counter
///         my_platform_get_tick_count_ms()
///     }
/// }
/// ```
pub trait Clock {
    /// Returns the current monotonic time in milliseconds.
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Adapts an `Fn() -> u64` closure, which is handy for wrapping a HAL timer.
#[derive(Debug, Clone, Copy)]
pub struct FnClock<F>(pub F);

impl<F: Fn() -> u64> Clock for FnClock<F> {
    fn now_ms(&self) -> u64 {
        (self.0)()
    }
}

/// A clock that only moves when told to.
///
/// Uses interior mutability so it can be advanced through the shared reference returned by
/// [`StateMachine::clock`](crate::StateMachine::clock).
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    /// A clock reading `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// A clock reading `now_ms`.
    #[must_use]
    pub const fn starting_at(now_ms: u64) -> Self {
        Self {
            now: Cell::new(now_ms),
        }
    }

    /// Moves time forward by `ms` (saturating at `u64::MAX`).
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }

    /// Jumps to an absolute reading. Callers keep it monotonic.
    pub fn set(&self, now_ms: u64) {
        debug_assert!(
            now_ms >= self.now.get(),
            "ManualClock moved backwards: {} -> {now_ms}",
            self.now.get()
        );
        self.now.set(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Wall-clock time since construction, backed by [`std::time::Instant`].
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_ms(&self) -> u64 {
        // Clamp instead of truncating; u64 milliseconds cover ~584 million years.
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_advanced() {
        let clock = ManualClock::new();
        assert_eq!(clock.now_ms(), 0);

        clock.advance(250);
        assert_eq!(clock.now_ms(), 250);

        clock.set(1_000);
        assert_eq!(clock.now_ms(), 1_000);
    }

    #[test]
    fn manual_clock_saturates_instead_of_wrapping() {
        let clock = ManualClock::starting_at(u64::MAX - 1);
        clock.advance(10);
        assert_eq!(clock.now_ms(), u64::MAX);
    }

    #[test]
    fn closures_and_references_are_clocks() {
        fn read<C: Clock>(clock: C) -> u64 {
            clock.now_ms()
        }

        assert_eq!(read(FnClock(|| 77)), 77);

        let manual = ManualClock::starting_at(5);
        assert_eq!(read(&manual), 5);
    }

    #[test]
    #[cfg(feature = "std")]
    fn std_clock_starts_near_zero() {
        let clock = StdClock::new();
        assert!(clock.now_ms() < 1_000);
    }
}
