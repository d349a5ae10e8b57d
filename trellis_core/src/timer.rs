// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A start/end time interval.
//!
//! [`Timer`] stores only its two endpoints. Every query is computed from the
//! `now` passed in, so there is no persisted elapsed state and repeated
//! queries with the same `now` are idempotent.

use crate::time::{Duration, HostTime};

/// Where a [`Timer`] sits on its timeline relative to a given `now`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerState {
    /// No start time.
    Unset,
    /// Start time is in the future.
    Pending,
    /// Started and not yet ended.
    Active,
    /// End time has been reached.
    Done,
}

/// A single interval with optional start and end points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    start: Option<HostTime>,
    end: Option<HostTime>,
}

impl Timer {
    /// Creates an unset timer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Sets the start point.
    pub fn set_start(&mut self, start: HostTime) {
        self.start = Some(start);
    }

    /// Sets the end point.
    pub fn set_end(&mut self, end: HostTime) {
        self.end = Some(end);
    }

    /// Sets both endpoints.
    pub fn set(&mut self, start: HostTime, end: HostTime) {
        self.start = Some(start);
        self.end = Some(end);
    }

    /// Resets both endpoints.
    pub fn clear(&mut self) {
        self.start = None;
        self.end = None;
    }

    /// Starts at `now`, keeping any previously set end point.
    pub fn start_now(&mut self, now: HostTime) {
        self.start = Some(now);
    }

    /// Starts at `now` and ends `duration` later.
    pub fn start_now_for(&mut self, now: HostTime, duration: Duration) {
        self.start = Some(now);
        self.end = Some(now.saturating_add(duration));
    }

    /// Starts `delay` after `now` and ends `duration` after that.
    pub fn start_after(&mut self, now: HostTime, delay: Duration, duration: Duration) {
        let start = now.saturating_add(delay);
        self.start = Some(start);
        self.end = Some(start.saturating_add(duration));
    }

    /// Returns the start point, if any.
    #[must_use]
    pub const fn start(&self) -> Option<HostTime> {
        self.start
    }

    /// Returns the end point, if any.
    #[must_use]
    pub const fn end(&self) -> Option<HostTime> {
        self.end
    }

    /// Returns `true` if a start point is present.
    #[must_use]
    pub const fn has_start(&self) -> bool {
        self.start.is_some()
    }

    /// Returns `true` if an end point is present.
    #[must_use]
    pub const fn has_end(&self) -> bool {
        self.end.is_some()
    }

    /// Returns `true` if both endpoints are present.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Returns `true` once `now` has reached the start point.
    #[must_use]
    pub fn is_started(&self, now: HostTime) -> bool {
        self.start.is_some_and(|start| now >= start)
    }

    /// Returns `true` once `now` has reached the end point.
    #[must_use]
    pub fn is_done(&self, now: HostTime) -> bool {
        self.end.is_some_and(|end| now >= end)
    }

    /// Returns `true` between the start point and the end point.
    ///
    /// A timer with a start but no end stays active indefinitely.
    #[must_use]
    pub fn is_active(&self, now: HostTime) -> bool {
        self.is_started(now) && self.end.is_none_or(|end| now < end)
    }

    /// Classifies the timer relative to `now`.
    #[must_use]
    pub fn state(&self, now: HostTime) -> TimerState {
        if self.start.is_none() {
            TimerState::Unset
        } else if self.is_done(now) {
            TimerState::Done
        } else if self.is_started(now) {
            TimerState::Active
        } else {
            TimerState::Pending
        }
    }

    /// Returns the distance between the endpoints, or zero if either is
    /// missing.
    #[must_use]
    pub fn duration(&self) -> Duration {
        match (self.start, self.end) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            _ => Duration::ZERO,
        }
    }

    /// Returns the time since the start point, or zero if unset or pending.
    #[must_use]
    pub fn elapsed(&self, now: HostTime) -> Duration {
        self.start
            .map_or(Duration::ZERO, |start| now.saturating_duration_since(start))
    }

    /// Returns the elapsed time in fractional milliseconds.
    #[must_use]
    pub fn elapsed_millis(&self, now: HostTime) -> f64 {
        self.elapsed(now).as_millis_f64()
    }

    /// Returns the elapsed time in fractional seconds.
    #[must_use]
    pub fn elapsed_seconds(&self, now: HostTime) -> f64 {
        self.elapsed(now).as_secs_f64()
    }

    /// Returns elapsed time as a fraction of the duration.
    ///
    /// A zero duration reports `0.0`. The value is not clamped and exceeds
    /// `1.0` after the end point.
    #[must_use]
    pub fn elapsed_percent(&self, now: HostTime) -> f64 {
        let duration = self.duration();
        if duration.is_zero() {
            0.0
        } else {
            self.elapsed(now).nanos() as f64 / duration.nanos() as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> HostTime {
        HostTime::from_millis(v)
    }

    #[test]
    fn state_machine_progression() {
        let mut timer = Timer::new();
        assert_eq!(timer.state(ms(0)), TimerState::Unset);

        timer.start_after(ms(0), Duration::from_millis(10), Duration::from_millis(100));
        assert_eq!(timer.state(ms(5)), TimerState::Pending);
        assert_eq!(timer.state(ms(10)), TimerState::Active);
        assert_eq!(timer.state(ms(109)), TimerState::Active);
        assert_eq!(timer.state(ms(110)), TimerState::Done);

        timer.clear();
        assert_eq!(timer.state(ms(200)), TimerState::Unset);
        assert!(!timer.is_set(), "cleared timer must be unset");
    }

    #[test]
    fn queries_are_idempotent_for_the_same_now() {
        let mut timer = Timer::new();
        timer.start_now_for(ms(0), Duration::from_millis(200));
        let a = timer.elapsed_percent(ms(50));
        let b = timer.elapsed_percent(ms(50));
        assert_eq!(a, b, "same now, same answer");
        assert!((a - 0.25).abs() < 1e-9, "50 of 200 ms");
    }

    #[test]
    fn zero_duration_reports_zero_percent() {
        let mut timer = Timer::new();
        timer.set(ms(10), ms(10));
        assert_eq!(timer.elapsed_percent(ms(20)), 0.0);
        assert!(timer.is_done(ms(10)), "end reached immediately");
    }

    #[test]
    fn start_without_end_stays_active() {
        let mut timer = Timer::new();
        timer.start_now(ms(0));
        assert!(timer.is_active(ms(1_000_000)), "open-ended timer");
        assert!(!timer.is_set(), "no end point");
        assert!(!timer.is_done(ms(1_000_000)), "never done without an end");
    }

    #[test]
    fn elapsed_units() {
        let mut timer = Timer::new();
        timer.start_now_for(ms(1_000), Duration::from_secs(1));
        assert!((timer.elapsed_millis(ms(1_500)) - 500.0).abs() < 1e-9);
        assert!((timer.elapsed_seconds(ms(1_500)) - 0.5).abs() < 1e-9);
        assert_eq!(timer.elapsed(ms(500)), Duration::ZERO, "before start");
        assert_eq!(timer.duration(), Duration::from_secs(1));
    }
}
