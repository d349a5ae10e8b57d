// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Publish/subscribe notification channels.
//!
//! A [`Signal`] holds an ordered list of listeners. Listeners run in
//! ascending group order, and in connection order within a group. Each
//! [`connect`](Signal::connect) returns a [`ConnectionId`] that removes the
//! listener again via [`disconnect`](Signal::disconnect).

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

/// Identifies one listener within one signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub(crate) u64);

/// Ordered listener storage shared by [`Signal`] and the scene's input
/// channels.
pub(crate) struct Slots<L> {
    entries: Vec<Slot<L>>,
    next_id: u64,
}

pub(crate) struct Slot<L> {
    pub(crate) id: ConnectionId,
    pub(crate) group: i32,
    pub(crate) listener: L,
}

impl<L> Default for Slots<L> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<L> Slots<L> {
    /// Inserts after every existing listener whose group is `<= group`.
    pub(crate) fn insert(&mut self, group: i32, listener: L) -> ConnectionId {
        let id = ConnectionId(self.next_id);
        self.next_id += 1;
        let pos = self.entries.partition_point(|slot| slot.group <= group);
        self.entries.insert(
            pos,
            Slot {
                id,
                group,
                listener,
            },
        );
        id
    }

    pub(crate) fn remove(&mut self, id: ConnectionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|slot| slot.id != id);
        self.entries.len() != before
    }

    pub(crate) fn retain(&mut self, f: impl FnMut(&Slot<L>) -> bool) {
        self.entries.retain(f);
    }

    pub(crate) fn iter_mut(&mut self) -> core::slice::IterMut<'_, Slot<L>> {
        self.entries.iter_mut()
    }

    pub(crate) fn iter(&self) -> core::slice::Iter<'_, Slot<L>> {
        self.entries.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

type Listener<E> = Box<dyn FnMut(&E)>;

/// A notification channel carrying events of type `E`.
pub struct Signal<E: ?Sized> {
    slots: Slots<Listener<E>>,
}

impl<E: ?Sized> Default for Signal<E> {
    fn default() -> Self {
        Self {
            slots: Slots::default(),
        }
    }
}

impl<E: ?Sized> fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.slots.len())
            .finish()
    }
}

impl<E: ?Sized> Signal<E> {
    /// Creates a signal with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects a listener in group 0.
    pub fn connect(&mut self, listener: impl FnMut(&E) + 'static) -> ConnectionId {
        self.slots.insert(0, Box::new(listener))
    }

    /// Connects a listener in the given group.
    ///
    /// Lower groups run first.
    pub fn connect_in_group(
        &mut self,
        group: i32,
        listener: impl FnMut(&E) + 'static,
    ) -> ConnectionId {
        self.slots.insert(group, Box::new(listener))
    }

    /// Removes a listener. Returns `false` if it was already gone.
    pub fn disconnect(&mut self, id: ConnectionId) -> bool {
        self.slots.remove(id)
    }

    /// Removes every listener.
    pub fn disconnect_all(&mut self) {
        self.slots.clear();
    }

    /// Runs every listener with `event`.
    pub fn emit(&mut self, event: &E) {
        for slot in self.slots.iter_mut() {
            (slot.listener)(event);
        }
    }

    /// Returns the number of connected listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no listeners are connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    #[test]
    fn groups_run_ascending_then_insertion_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut signal = Signal::<u32>::new();
        for (group, tag) in [(1, 'a'), (0, 'b'), (1, 'c'), (-3, 'd'), (0, 'e')] {
            let log = Rc::clone(&log);
            signal.connect_in_group(group, move |_| log.borrow_mut().push(tag));
        }
        signal.emit(&7);
        assert_eq!(*log.borrow(), vec!['d', 'b', 'e', 'a', 'c']);
    }

    #[test]
    fn disconnect_removes_only_that_listener() {
        let hits = Rc::new(RefCell::new(0_u32));
        let mut signal = Signal::<()>::new();
        let h1 = Rc::clone(&hits);
        let first = signal.connect(move |()| *h1.borrow_mut() += 1);
        let h2 = Rc::clone(&hits);
        signal.connect(move |()| *h2.borrow_mut() += 10);

        assert!(signal.disconnect(first), "first listener was connected");
        assert!(!signal.disconnect(first), "second disconnect is a no-op");
        signal.emit(&());
        assert_eq!(*hits.borrow(), 10);
        assert_eq!(signal.len(), 1);
    }

    #[test]
    fn listeners_receive_the_event() {
        let seen = Rc::new(RefCell::new(None));
        let mut signal = Signal::<&'static str>::new();
        let sink = Rc::clone(&seen);
        signal.connect(move |e| *sink.borrow_mut() = Some(*e));
        signal.emit(&"hello");
        assert_eq!(*seen.borrow(), Some("hello"));
        signal.disconnect_all();
        assert!(signal.is_empty(), "all listeners removed");
    }
}
