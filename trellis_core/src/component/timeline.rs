// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drives a set of tweens from a node's update.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use super::{Component, ComponentError, ComponentTag, ComponentType, UpdateContext};
use crate::easing::{Easing, Interpolate};
use crate::signal::Signal;
use crate::time::HostTime;
use crate::tween::{AnyTween, Tween, TweenRef};

type ValueHook = Box<dyn FnMut()>;

struct Entry {
    tween: Rc<RefCell<dyn AnyTween>>,
    on_update: Option<ValueHook>,
}

impl Entry {
    fn key(&self) -> *const () {
        Rc::as_ptr(&self.tween).cast()
    }
}

fn key_of<T: Interpolate>(tween: &TweenRef<T>) -> *const () {
    Rc::as_ptr(tween).cast()
}

/// Reads the tween's current value and hands a copy to `f`.
fn value_hook<T: Interpolate + 'static>(
    tween: &TweenRef<T>,
    mut f: impl FnMut(&T) + 'static,
) -> ValueHook {
    let weak = Rc::downgrade(tween);
    Box::new(move || {
        let Some(tween) = weak.upgrade() else {
            return;
        };
        let value = match tween.try_borrow() {
            Ok(t) => t.value().clone(),
            Err(_) => return,
        };
        f(&value);
    })
}

/// A set of concurrently running tweens.
///
/// Each [`tick`](Self::tick) (run by the owning node's update) advances every
/// tracked tween, calls its value hook once it has started, finishes it when
/// done, and stops tracking any tween that is no longer running. A tween
/// that has not been started when it is ticked is dropped immediately, so
/// start tweens before adding them or before the next update.
///
/// [`started`](Self::started) fires on the first tick that finds tweens after
/// an idle period; [`done`](Self::done) fires on the tick that empties the
/// timeline. Both can fire in the same tick.
pub struct Timeline {
    entries: Vec<Entry>,
    idle: bool,
    /// Fired when the timeline goes from idle to running.
    pub started: Signal<()>,
    /// Fired when the last tween has finished.
    pub done: Signal<()>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("tweens", &self.entries.len())
            .field("idle", &self.idle)
            .finish_non_exhaustive()
    }
}

impl Timeline {
    /// Creates an empty, idle timeline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            idle: true,
            started: Signal::new(),
            done: Signal::new(),
        }
    }

    /// Tracks `tween`. Adding a tracked tween again clears its value hook.
    pub fn add<T: Interpolate + 'static>(&mut self, tween: &TweenRef<T>) {
        self.insert(tween, None);
    }

    /// Tracks `tween` and calls `f` with its value on every tick once it has
    /// started.
    pub fn add_with_update<T: Interpolate + 'static>(
        &mut self,
        tween: &TweenRef<T>,
        f: impl FnMut(&T) + 'static,
    ) {
        self.insert(tween, Some(value_hook(tween, f)));
    }

    /// Creates an unstarted tween and tracks it.
    pub fn tween<T: Interpolate + 'static>(
        &mut self,
        start: T,
        end: T,
        easing: impl Into<Easing>,
    ) -> TweenRef<T> {
        let tween = Tween::new(start, end, easing).into_ref();
        self.add(&tween);
        tween
    }

    /// Replaces the value hook of a tracked tween. Returns `false` if the
    /// tween is not tracked.
    pub fn set_tween_update<T: Interpolate + 'static>(
        &mut self,
        tween: &TweenRef<T>,
        f: impl FnMut(&T) + 'static,
    ) -> bool {
        let key = key_of(tween);
        match self.entries.iter_mut().find(|e| e.key() == key) {
            Some(entry) => {
                entry.on_update = Some(value_hook(tween, f));
                true
            }
            None => false,
        }
    }

    /// Stops tracking `tween` without finishing it.
    pub fn remove<T: Interpolate + 'static>(&mut self, tween: &TweenRef<T>) -> bool {
        let key = key_of(tween);
        let before = self.entries.len();
        self.entries.retain(|e| e.key() != key);
        self.entries.len() != before
    }

    /// Stops tracking every tween.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns `true` if `tween` is tracked.
    #[must_use]
    pub fn contains<T: Interpolate + 'static>(&self, tween: &TweenRef<T>) -> bool {
        let key = key_of(tween);
        self.entries.iter().any(|e| e.key() == key)
    }

    /// Returns the number of tracked tweens.
    #[must_use]
    pub fn tween_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` while any tween is tracked.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Advances every tracked tween to `now`.
    pub fn tick(&mut self, now: HostTime) {
        if self.entries.is_empty() {
            return;
        }
        if self.idle {
            self.idle = false;
            self.started.emit(&());
        }

        self.entries.retain_mut(|entry| {
            let Ok(mut tween) = entry.tween.try_borrow_mut() else {
                return true;
            };
            let keep = tween.advance(now);
            let started = tween.is_started(now);
            let done = tween.is_done(now);
            drop(tween);

            if started {
                if let Some(hook) = entry.on_update.as_mut() {
                    hook();
                }
            }
            if done {
                finish(&entry.tween);
            }
            keep
        });

        if self.entries.is_empty() {
            self.idle = true;
            self.done.emit(&());
        }
    }

    fn insert<T: Interpolate + 'static>(&mut self, tween: &TweenRef<T>, on_update: Option<ValueHook>) {
        let key = key_of(tween);
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key() == key) {
            entry.on_update = on_update;
            return;
        }
        let erased: Rc<RefCell<dyn AnyTween>> = tween.clone();
        self.entries.push(Entry {
            tween: erased,
            on_update,
        });
    }
}

/// Snaps a finished tween to its end value and runs its completion callback
/// while the tween is not borrowed. A faulting callback is dropped.
fn finish(tween: &Rc<RefCell<dyn AnyTween>>) {
    let Ok(mut t) = tween.try_borrow_mut() else {
        return;
    };
    let Some(mut callback) = t.settle() else {
        return;
    };
    drop(t);
    match callback.invoke() {
        Ok(()) => {
            if let Ok(mut t) = tween.try_borrow_mut() {
                t.restore_on_done(callback);
            }
        }
        Err(fault) => {
            let name = tween.try_borrow().map(|t| String::from(t.name()));
            log::error!(
                "tween '{}': completion callback fault, discarding: {fault}",
                name.as_deref().unwrap_or("?")
            );
        }
    }
}

impl Component for Timeline {
    fn update(&mut self, cx: &mut UpdateContext<'_>) {
        self.tick(cx.now);
    }
}

impl ComponentType for Timeline {
    const TAG: ComponentTag = ComponentTag("trellis.timeline");

    fn construct() -> Result<Self, ComponentError> {
        Ok(Self::new())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use core::cell::Cell;

    use super::*;
    use crate::callback::{Callback, CallbackFault};
    use crate::easing::EaseType;
    use crate::time::Duration;

    fn ms(v: u64) -> HostTime {
        HostTime::from_millis(v)
    }

    fn started(now: HostTime, millis: u64) -> TweenRef<f32> {
        let tween = Tween::new(0.0_f32, 10.0, EaseType::Linear).into_ref();
        tween
            .borrow_mut()
            .start_now_for(now, Duration::from_millis(millis));
        tween
    }

    fn counting(signal: &mut Signal<()>) -> Rc<Cell<u32>> {
        let hits = Rc::new(Cell::new(0));
        let c = Rc::clone(&hits);
        signal.connect(move |_| c.set(c.get() + 1));
        hits
    }

    #[test]
    fn start_and_done_fire_once_per_run() {
        let mut timeline = Timeline::new();
        let starts = counting(&mut timeline.started);
        let dones = counting(&mut timeline.done);

        timeline.tick(ms(0));
        assert_eq!((starts.get(), dones.get()), (0, 0), "empty tick is silent");

        let tween = started(ms(0), 100);
        timeline.add(&tween);
        timeline.tick(ms(10));
        assert_eq!((starts.get(), dones.get()), (1, 0));
        timeline.tick(ms(50));
        assert_eq!((starts.get(), dones.get()), (1, 0), "no repeat while running");

        timeline.tick(ms(100));
        assert_eq!((starts.get(), dones.get()), (1, 1));
        assert!(!timeline.is_active());
        timeline.tick(ms(200));
        assert_eq!((starts.get(), dones.get()), (1, 1), "idle tick is silent");
        assert_eq!(*tween.borrow().value(), 10.0);
    }

    #[test]
    fn value_hook_waits_for_start() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let tween = Tween::new(0.0_f32, 10.0, EaseType::Linear).into_ref();
        tween.borrow_mut().start_after_delay(
            ms(0),
            Duration::from_millis(100),
            Duration::from_millis(100),
        );
        let mut timeline = Timeline::new();
        let sink = Rc::clone(&seen);
        timeline.add_with_update(&tween, move |v| sink.borrow_mut().push(*v));

        timeline.tick(ms(50));
        assert!(seen.borrow().is_empty(), "pending tween reports nothing");
        timeline.tick(ms(150));
        timeline.tick(ms(200));
        assert_eq!(*seen.borrow(), vec![5.0, 10.0]);
        assert_eq!(timeline.tween_count(), 0);
    }

    #[test]
    fn completion_callback_fires_once() {
        let hits = Rc::new(Cell::new(0));
        let c = Rc::clone(&hits);
        let tween = started(ms(0), 10);
        tween
            .borrow_mut()
            .set_on_done(Some(Callback::new(move || c.set(c.get() + 1))));
        let mut timeline = Timeline::new();
        timeline.add(&tween);
        timeline.tick(ms(20));
        timeline.tick(ms(30));
        assert_eq!(hits.get(), 1);
        assert!(!tween.borrow().is_set(), "finished tween is cleared");
    }

    #[test]
    fn faulting_callback_is_discarded() {
        let tween = started(ms(0), 10);
        tween.borrow_mut().set_on_done(Some(Callback::fallible(|| {
            Err(CallbackFault::new("boom"))
        })));
        let mut timeline = Timeline::new();
        timeline.add(&tween);
        timeline.tick(ms(10));

        // Restart; the callback must not run (or fault) again.
        let hits = Rc::new(Cell::new(0));
        tween.borrow_mut().start_now_for(ms(20), Duration::from_millis(10));
        timeline.add(&tween);
        let c = Rc::clone(&hits);
        timeline.set_tween_update(&tween, move |_| c.set(c.get() + 1));
        timeline.tick(ms(40));
        assert_eq!(hits.get(), 1, "second run still ticks");
        assert_eq!(*tween.borrow().value(), 10.0);
    }

    #[test]
    fn unstarted_tween_is_dropped_on_first_tick() {
        let mut timeline = Timeline::new();
        let tween = timeline.tween(0.0_f32, 1.0, EaseType::Linear);
        assert!(timeline.contains(&tween));
        timeline.tick(ms(0));
        assert!(!timeline.contains(&tween));
    }

    #[test]
    fn add_is_idempotent_and_remove_by_identity() {
        let mut timeline = Timeline::new();
        let a = started(ms(0), 100);
        let b = started(ms(0), 100);
        timeline.add(&a);
        timeline.add(&a);
        timeline.add(&b);
        assert_eq!(timeline.tween_count(), 2);
        assert!(timeline.remove(&a));
        assert!(!timeline.remove(&a));
        assert!(timeline.contains(&b));
        timeline.clear();
        assert!(!timeline.is_active());
    }

    #[test]
    fn tweens_of_different_types_share_a_timeline() {
        let mut timeline = Timeline::new();
        let scalar = started(ms(0), 100);
        let point = Tween::new(glam::Vec3::ZERO, glam::Vec3::new(4.0, 0.0, 0.0), EaseType::Linear)
            .into_ref();
        point
            .borrow_mut()
            .start_now_for(ms(0), Duration::from_millis(100));
        timeline.add(&scalar);
        timeline.add(&point);
        assert_eq!(timeline.tween_count(), 2, "both tweens erased into one list");
        assert!(timeline.contains(&point), "lookup by identity across types");

        timeline.tick(ms(50));
        assert_eq!(point.borrow().value().x, 2.0, "vector tween advanced");
        assert_eq!(*scalar.borrow().value(), 5.0, "scalar tween advanced");
    }
}
