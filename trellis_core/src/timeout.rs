// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Delayed one-shot callbacks.
//!
//! [`TimeoutManager`] keeps its [`Timeout`] records sorted by end time. Each
//! call to [`update_timeouts`](TimeoutManager::update_timeouts) fires every
//! due timeout in that order and removes it. A callback fault is logged and
//! never reaches the caller.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::callback::Callback;
use crate::time::{Duration, HostTime};
use crate::timer::Timer;
use crate::trace::{CallbackFaultEvent, FaultSource, TimeoutFiredEvent, Tracer};

/// A callback scheduled to run once its timer is done.
#[derive(Debug)]
pub struct Timeout {
    timer: Timer,
    callback: Option<Callback>,
    name: String,
}

impl Timeout {
    /// Returns the timeout's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the timer governing when the callback fires.
    #[must_use]
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Returns the time at which the callback is due.
    #[must_use]
    pub fn due(&self) -> Option<HostTime> {
        self.timer.end()
    }

    fn clear(&mut self) {
        self.timer.clear();
        self.callback = None;
        self.name.clear();
    }
}

/// Owns a set of timeouts ordered by end time.
#[derive(Debug, Default)]
pub struct TimeoutManager {
    timeouts: Vec<Timeout>,
    next_seq: u64,
}

impl TimeoutManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `callback` to run `delay` after `now`.
    ///
    /// Returns the timeout's name, which is `name` if given and otherwise a
    /// generated `timeout-N` unique to this manager. Timeouts with equal end
    /// times keep their registration order.
    pub fn set_timeout(
        &mut self,
        now: HostTime,
        delay: Duration,
        callback: Callback,
        name: Option<&str>,
    ) -> String {
        let seq = self.next_seq;
        self.next_seq += 1;
        let name = match name {
            Some(name) if !name.is_empty() => String::from(name),
            _ => format!("timeout-{seq}"),
        };

        let mut timer = Timer::new();
        timer.start_now_for(now, delay);
        self.timeouts.push(Timeout {
            timer,
            callback: Some(callback),
            name: name.clone(),
        });
        // Stable sort keeps insertion order among equal end times.
        self.timeouts.sort_by_key(|t| t.timer.end());
        name
    }

    /// Fires and removes every timeout that is done at `now`.
    ///
    /// Also prunes any timeout whose timer is no longer set. Returns the
    /// number of callbacks that ran.
    pub fn update_timeouts(&mut self, now: HostTime) -> usize {
        self.update_timeouts_traced(now, &mut Tracer::none())
    }

    /// Like [`update_timeouts`](Self::update_timeouts), reporting fired
    /// timeouts and callback faults to `tracer`.
    pub fn update_timeouts_traced(&mut self, now: HostTime, tracer: &mut Tracer<'_>) -> usize {
        let mut fired = 0;
        self.timeouts.retain_mut(|timeout| {
            if timeout.timer.is_done(now) {
                if let Some(callback) = timeout.callback.as_mut() {
                    fired += 1;
                    match callback.invoke() {
                        Ok(()) => {
                            log::trace!("[{}] timeout fired", timeout.name);
                            tracer.timeout_fired(&TimeoutFiredEvent {
                                name: &timeout.name,
                                due: timeout.timer.end().unwrap_or(now),
                                fired_at: now,
                            });
                        }
                        Err(fault) => {
                            log::error!("[{}] timeout callback fault: {fault}", timeout.name);
                            tracer.callback_fault(&CallbackFaultEvent {
                                source: FaultSource::Timeout,
                                name: &timeout.name,
                                message: fault.message(),
                                at: now,
                            });
                        }
                    }
                }
                return false;
            }
            timeout.timer.is_set()
        });
        fired
    }

    /// Removes every timeout named `name`. Returns whether any was removed.
    pub fn cancel_timeout(&mut self, name: &str) -> bool {
        let mut removed = false;
        self.timeouts.retain_mut(|timeout| {
            if timeout.name == name {
                timeout.clear();
                removed = true;
                false
            } else {
                true
            }
        });
        removed
    }

    /// Returns the pending timeouts in firing order.
    #[must_use]
    pub fn timeouts(&self) -> &[Timeout] {
        &self.timeouts
    }

    /// Returns the number of pending timeouts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timeouts.len()
    }

    /// Returns `true` if nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timeouts.is_empty()
    }
}
