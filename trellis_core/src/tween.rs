// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timed interpolation between two values.
//!
//! A [`Tween<T>`] is a [`Timer`] plus a start value, an end value, and an
//! [`Easing`]. While its timer is active it produces an eased value; when
//! the timer is done it snaps to the end value, fires its completion
//! callback once, and clears its timer. A finished tween stays idle until it
//! is explicitly restarted.
//!
//! A tween may be bound to an external `Rc<RefCell<T>>` through a weak
//! reference. If that cell has been dropped, or is borrowed elsewhere when a
//! write is attempted, the binding is removed for good.

use alloc::rc::{Rc, Weak};
use alloc::string::String;
use core::cell::RefCell;
use core::fmt;

use crate::callback::Callback;
use crate::easing::{EaseType, Easing, Interpolate, interpolate};
use crate::time::{Duration, HostTime};
use crate::timer::Timer;

/// Shared handle to a tween, as tracked by a
/// [`Timeline`](crate::component::Timeline).
pub type TweenRef<T> = Rc<RefCell<Tween<T>>>;

/// An eased interpolation from a start value to an end value over time.
pub struct Tween<T: Interpolate> {
    timer: Timer,
    start: T,
    end: T,
    value: T,
    easing: Easing,
    on_done: Option<Callback>,
    bound: Option<Weak<RefCell<T>>>,
    name: String,
}

impl<T: Interpolate + fmt::Debug> fmt::Debug for Tween<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("name", &self.name)
            .field("timer", &self.timer)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("value", &self.value)
            .field("easing", &self.easing)
            .field("has_on_done", &self.on_done.is_some())
            .field("bound", &self.bound.is_some())
            .finish()
    }
}

impl<T: Interpolate> Tween<T> {
    /// Creates an unstarted tween.
    pub fn new(start: T, end: T, easing: impl Into<Easing>) -> Self {
        Self {
            timer: Timer::new(),
            value: start.clone(),
            start,
            end,
            easing: easing.into(),
            on_done: None,
            bound: None,
            name: String::new(),
        }
    }

    /// Wraps the tween in a shared handle.
    #[must_use]
    pub fn into_ref(self) -> TweenRef<T> {
        Rc::new(RefCell::new(self))
    }

    /// Sets the completion callback.
    #[must_use]
    pub fn with_on_done(mut self, on_done: impl Into<Callback>) -> Self {
        self.on_done = Some(on_done.into());
        self
    }

    /// Sets a name for diagnostics.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    // -- configuration --

    /// Replaces start value, end value, easing and callback at once.
    pub fn set(&mut self, start: T, end: T, easing: impl Into<Easing>, on_done: Option<Callback>) {
        self.start = start;
        self.end = end;
        self.easing = easing.into();
        self.on_done = on_done;
    }

    /// Sets the start value.
    pub fn set_start_value(&mut self, start: T) {
        self.start = start;
    }

    /// Sets the end value.
    pub fn set_end_value(&mut self, end: T) {
        self.end = end;
    }

    /// Selects a built-in curve.
    pub fn set_ease_type(&mut self, kind: EaseType) {
        self.easing = kind.into();
    }

    /// Installs a custom curve; [`ease_type`](Self::ease_type) then reports
    /// [`EaseType::Custom`].
    pub fn set_ease_fn(&mut self, f: impl Fn(f32) -> f32 + 'static) {
        self.easing = Easing::custom(f);
    }

    /// Sets or clears the completion callback.
    pub fn set_on_done(&mut self, on_done: Option<Callback>) {
        self.on_done = on_done;
    }

    /// Writes every computed value into `target` until unbound or the target
    /// is dropped.
    pub fn bind(&mut self, target: &Rc<RefCell<T>>) {
        self.bound = Some(Rc::downgrade(target));
    }

    /// Removes the binding.
    pub fn unbind(&mut self) {
        self.bound = None;
    }

    /// Sets the name used in diagnostics.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    // -- accessors --

    /// Returns the diagnostic name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the start value.
    #[must_use]
    pub fn start_value(&self) -> &T {
        &self.start
    }

    /// Returns the end value.
    #[must_use]
    pub fn end_value(&self) -> &T {
        &self.end
    }

    /// Returns the most recently computed value.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Returns the kind of the current curve.
    #[must_use]
    pub fn ease_type(&self) -> EaseType {
        self.easing.kind()
    }

    /// Returns `true` if a live binding is installed.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound.as_ref().is_some_and(|w| w.strong_count() > 0)
    }

    /// Returns the underlying timer.
    #[must_use]
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Returns `true` if both timer endpoints are present.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.timer.is_set()
    }

    /// Returns `true` once `now` has reached the start time.
    #[must_use]
    pub fn is_started(&self, now: HostTime) -> bool {
        self.timer.is_started(now)
    }

    /// Returns `true` between start and end.
    #[must_use]
    pub fn is_active(&self, now: HostTime) -> bool {
        self.timer.is_active(now)
    }

    /// Returns `true` once `now` has reached the end time.
    #[must_use]
    pub fn is_done(&self, now: HostTime) -> bool {
        self.timer.is_done(now)
    }

    // -- control --

    /// Restarts from the start value at `now`, keeping the existing end time.
    pub fn start_now(&mut self, now: HostTime) {
        self.value = self.start.clone();
        self.timer.start_now(now);
    }

    /// Restarts from the start value at `now`, ending `duration` later.
    pub fn start_now_for(&mut self, now: HostTime, duration: Duration) {
        self.value = self.start.clone();
        self.timer.start_now_for(now, duration);
    }

    /// Schedules the tween to start `delay` after `now` and run for
    /// `duration`.
    pub fn start_after_delay(&mut self, now: HostTime, delay: Duration, duration: Duration) {
        self.timer.start_after(now, delay, duration);
    }

    /// Advances the tween and returns its value.
    ///
    /// Call once per frame when using a binding. While active the value
    /// follows the eased curve; once done the tween finishes (see
    /// [`end_now`](Self::end_now) with `fire = true`). Later calls are no-ops
    /// until the tween is restarted, so the completion callback fires at
    /// most once per run.
    pub fn update(&mut self, now: HostTime) -> &T {
        if self.timer.is_set() && self.timer.is_active(now) {
            self.value = self.eased_value(now);
            self.write_binding();
        }
        if self.timer.is_done(now) {
            self.finish(true);
        }
        &self.value
    }

    /// Ends immediately at the end value, optionally firing the completion
    /// callback, and returns the end value.
    pub fn end_now(&mut self, fire: bool) -> &T {
        self.finish(fire);
        &self.value
    }

    fn eased_value(&self, now: HostTime) -> T {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "easing works in f32; percent precision beyond f32 is irrelevant"
        )]
        let pct = self.timer.elapsed_percent(now) as f32;
        interpolate(&self.start, &self.end, pct, &self.easing, true)
    }

    fn write_binding(&mut self) {
        let Some(weak) = &self.bound else {
            return;
        };
        let written = weak
            .upgrade()
            .is_some_and(|cell| match cell.try_borrow_mut() {
                Ok(mut slot) => {
                    *slot = self.value.clone();
                    true
                }
                Err(_) => false,
            });
        if !written {
            log::warn!("tween '{}': bound value unavailable, unbinding", self.name);
            self.bound = None;
        }
    }

    fn finish(&mut self, fire: bool) {
        if let Some(mut callback) = self.settle() {
            if fire {
                if let Err(fault) = callback.invoke() {
                    log::error!("tween '{}': completion callback fault: {fault}", self.name);
                    return;
                }
            }
            self.restore_on_done(callback);
        }
    }

    /// Snaps to the end value, writes the binding, clears the timer, and
    /// hands out the completion callback so it can run without the tween
    /// being borrowed.
    fn settle(&mut self) -> Option<Callback> {
        self.value = self.end.clone();
        self.write_binding();
        self.timer.clear();
        self.on_done.take()
    }

    fn restore_on_done(&mut self, callback: Callback) {
        if self.on_done.is_none() {
            self.on_done = Some(callback);
        }
    }

    /// One timeline step: refreshes the value without finishing.
    ///
    /// Returns `true` while the tween should stay tracked (set and not done).
    fn advance(&mut self, now: HostTime) -> bool {
        if self.timer.is_set() {
            if self.timer.is_active(now) {
                self.value = self.eased_value(now);
            } else if self.timer.is_done(now) {
                self.value = self.end.clone();
            }
            self.write_binding();
        }
        self.timer.is_set() && !self.timer.is_done(now)
    }
}

/// Type-erased tween operations used by the timeline.
pub(crate) trait AnyTween {
    fn advance(&mut self, now: HostTime) -> bool;
    fn is_started(&self, now: HostTime) -> bool;
    fn is_done(&self, now: HostTime) -> bool;
    fn settle(&mut self) -> Option<Callback>;
    fn restore_on_done(&mut self, callback: Callback);
    fn name(&self) -> &str;
}

impl<T: Interpolate> AnyTween for Tween<T> {
    fn advance(&mut self, now: HostTime) -> bool {
        Self::advance(self, now)
    }

    fn is_started(&self, now: HostTime) -> bool {
        self.timer.is_started(now)
    }

    fn is_done(&self, now: HostTime) -> bool {
        self.timer.is_done(now)
    }

    fn settle(&mut self) -> Option<Callback> {
        Self::settle(self)
    }

    fn restore_on_done(&mut self, callback: Callback) {
        Self::restore_on_done(self, callback);
    }

    fn name(&self) -> &str {
        &self.name
    }
}
