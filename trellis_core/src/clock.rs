// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time sources for the frame loop.
//!
//! A [`Scene`](crate::scene::Scene) reads the current [`HostTime`] from a
//! [`Clock`] once per entry point and hands that value down to timers,
//! tweens, and timeouts. Hosts with their own frame timestamps can implement
//! [`Clock`] directly; tests use [`ManualClock`] to step time
//! deterministically.

use alloc::rc::Rc;
use core::cell::Cell;

use crate::time::{Duration, HostTime};

/// A monotonic time source.
pub trait Clock {
    /// Returns the current time.
    fn now(&self) -> HostTime;
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// give another to a scene.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<HostTime>>,
}

impl ManualClock {
    /// Creates a clock reading [`HostTime::ZERO`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock reading `start`.
    #[must_use]
    pub fn starting_at(start: HostTime) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by));
    }

    /// Moves the clock forward by `millis` milliseconds.
    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Sets the clock to an absolute time.
    pub fn set(&self, now: HostTime) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> HostTime {
        self.now.get()
    }
}

/// Wall-clock time from [`std::time::Instant`], measured from construction.
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemClock {
    /// Creates a clock whose origin is the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u64 nanoseconds cover several centuries of uptime"
    )]
    fn now(&self) -> HostTime {
        HostTime(self.origin.elapsed().as_nanos() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        assert_eq!(clock.now(), HostTime::ZERO);
        handle.advance_millis(16);
        assert_eq!(clock.now(), HostTime::from_millis(16), "clone advanced");
        clock.set(HostTime(5));
        assert_eq!(handle.now(), HostTime(5));
    }

    #[test]
    fn starting_at_sets_initial_time() {
        let clock = ManualClock::starting_at(HostTime::from_millis(100));
        assert_eq!(clock.now().as_millis(), 100);
    }

    #[cfg(feature = "std")]
    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a, "system clock went backwards");
    }
}
