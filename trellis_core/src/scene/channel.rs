// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input fan-out.
//!
//! An [`InputChannel`] is a [`Signal`](crate::signal::Signal)-like ordered
//! listener list whose listeners may also be components. Component listeners
//! are stored as `(node, tag)` pairs and resolved against the tree on every
//! dispatch, so a component never holds a reference to its scene.

use alloc::boxed::Box;
use core::fmt;

use crate::component::{Component, ComponentTag, EventContext};
use crate::event::{KeyEvent, MouseEvent, TouchEvent};
use crate::node::{NodeId, NodeTree};
use crate::signal::{ConnectionId, Slots};

enum Listener<E> {
    Closure(Box<dyn FnMut(&mut E)>),
    Component { node: NodeId, tag: ComponentTag },
}

impl<E> Listener<E> {
    fn targets(&self, node: NodeId, tag: Option<ComponentTag>) -> bool {
        match self {
            Self::Closure(_) => false,
            Self::Component { node: n, tag: t } => *n == node && tag.is_none_or(|tag| *t == tag),
        }
    }
}

/// Routes one kind of input event to closures and subscribed components.
///
/// Listeners run in ascending group order, then connection order. Every
/// listener sees the event, including its `captured` flag as set by earlier
/// listeners.
pub struct InputChannel<E> {
    slots: Slots<Listener<E>>,
}

impl<E> Default for InputChannel<E> {
    fn default() -> Self {
        Self {
            slots: Slots::default(),
        }
    }
}

impl<E> fmt::Debug for InputChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let components = self
            .slots
            .iter()
            .filter(|s| matches!(s.listener, Listener::Component { .. }))
            .count();
        f.debug_struct("InputChannel")
            .field("listeners", &self.slots.len())
            .field("components", &components)
            .finish()
    }
}

impl<E> InputChannel<E> {
    /// Connects a closure in group 0.
    pub fn connect(&mut self, listener: impl FnMut(&mut E) + 'static) -> ConnectionId {
        self.connect_in_group(0, listener)
    }

    /// Connects a closure in `group`; lower groups run first.
    pub fn connect_in_group(
        &mut self,
        group: i32,
        listener: impl FnMut(&mut E) + 'static,
    ) -> ConnectionId {
        self.slots
            .insert(group, Listener::Closure(Box::new(listener)))
    }

    /// Removes a closure or subscription. Returns `false` if it was already
    /// gone.
    pub fn disconnect(&mut self, id: ConnectionId) -> bool {
        self.slots.remove(id)
    }

    /// Returns the number of listeners, components included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing listens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.len() == 0
    }

    /// Returns `true` if the component `tag` on `node` is subscribed.
    #[must_use]
    pub fn is_subscribed(&self, node: NodeId, tag: ComponentTag) -> bool {
        self.slots
            .iter()
            .any(|s| s.listener.targets(node, Some(tag)))
    }

    /// Subscribes a component, replacing any earlier subscription of it.
    pub(crate) fn subscribe(&mut self, group: i32, node: NodeId, tag: ComponentTag) {
        self.unsubscribe(node, Some(tag));
        self.slots
            .insert(group, Listener::Component { node, tag });
    }

    /// Drops the subscription of `tag` on `node`, or of every component on
    /// `node` when `tag` is `None`.
    pub(crate) fn unsubscribe(&mut self, node: NodeId, tag: Option<ComponentTag>) {
        self.slots.retain(|s| !s.listener.targets(node, tag));
    }
}

/// Event types a component can receive.
pub(crate) trait InputEvent: Sized {
    fn deliver(component: &mut dyn Component, cx: &mut EventContext<'_>, event: &mut Self);
}

impl InputEvent for TouchEvent {
    fn deliver(component: &mut dyn Component, cx: &mut EventContext<'_>, event: &mut Self) {
        component.touch_event(cx, event);
    }
}

impl InputEvent for MouseEvent {
    fn deliver(component: &mut dyn Component, cx: &mut EventContext<'_>, event: &mut Self) {
        component.mouse_event(cx, event);
    }
}

impl InputEvent for KeyEvent {
    fn deliver(component: &mut dyn Component, cx: &mut EventContext<'_>, event: &mut Self) {
        component.key_event(cx, event);
    }
}

impl<E: InputEvent> InputChannel<E> {
    /// Runs every listener with `event`. Subscriptions whose component has
    /// gone are skipped.
    pub(crate) fn dispatch(&mut self, tree: &mut NodeTree, event: &mut E) {
        for slot in self.slots.iter_mut() {
            match &mut slot.listener {
                Listener::Closure(f) => f(&mut *event),
                Listener::Component { node, tag } => {
                    let node = *node;
                    tree.with_component(node, *tag, |component, tree| {
                        E::deliver(component, &mut EventContext { tree, node }, &mut *event);
                    });
                }
            }
        }
    }
}

/// The three input channels of a scene.
#[derive(Debug, Default)]
pub(crate) struct InputChannels {
    pub(crate) touch: InputChannel<TouchEvent>,
    pub(crate) mouse: InputChannel<MouseEvent>,
    pub(crate) key: InputChannel<KeyEvent>,
}

impl InputChannels {
    pub(crate) fn unsubscribe(&mut self, node: NodeId, tag: Option<ComponentTag>) {
        self.touch.unsubscribe(node, tag);
        self.mouse.unsubscribe(node, tag);
        self.key.unsubscribe(node, tag);
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use super::*;
    use crate::component::{ComponentError, ComponentType};
    use crate::event::TouchKind;

    #[derive(Default)]
    struct Tap {
        hits: u32,
    }

    impl Component for Tap {
        fn touch_event(&mut self, _cx: &mut EventContext<'_>, event: &mut TouchEvent) {
            self.hits += 1;
            event.captured = true;
        }
    }

    impl ComponentType for Tap {
        const TAG: ComponentTag = ComponentTag("test.tap");

        fn construct() -> Result<Self, ComponentError> {
            Ok(Self::default())
        }
    }

    #[test]
    fn groups_order_closures_and_components() {
        let mut tree = NodeTree::new();
        let node = tree.create_node();
        tree.add_component(node, Tap::default());
        let log = Rc::new(RefCell::new(Vec::new()));

        let mut channel = InputChannel::<TouchEvent>::default();
        let early = Rc::clone(&log);
        channel.connect_in_group(-1, move |e| early.borrow_mut().push(e.captured));
        channel.subscribe(0, node, Tap::TAG);
        let late = Rc::clone(&log);
        channel.connect_in_group(1, move |e| late.borrow_mut().push(e.captured));

        let mut event = TouchEvent::new(TouchKind::Press, (0.0, 0.0));
        channel.dispatch(&mut tree, &mut event);
        assert_eq!(*log.borrow(), vec![false, true], "component ran between");
        assert_eq!(tree.get_component::<Tap>(node).map(|t| t.hits), Some(1));
    }

    #[test]
    fn subscribe_is_idempotent() {
        let mut tree = NodeTree::new();
        let node = tree.create_node();
        tree.add_component(node, Tap::default());
        let mut channel = InputChannel::<TouchEvent>::default();
        channel.subscribe(0, node, Tap::TAG);
        channel.subscribe(5, node, Tap::TAG);
        assert_eq!(channel.len(), 1);

        let mut event = TouchEvent::new(TouchKind::Press, (0.0, 0.0));
        channel.dispatch(&mut tree, &mut event);
        assert_eq!(tree.get_component::<Tap>(node).map(|t| t.hits), Some(1));

        channel.unsubscribe(node, None);
        assert!(!channel.is_subscribed(node, Tap::TAG));
        assert!(channel.is_empty());
    }

    #[test]
    fn stale_subscriptions_are_skipped() {
        let mut tree = NodeTree::new();
        let node = tree.create_node();
        tree.add_component(node, Tap::default());
        let mut channel = InputChannel::<TouchEvent>::default();
        channel.subscribe(0, node, Tap::TAG);
        tree.destroy(node);

        let mut event = TouchEvent::new(TouchKind::Press, (0.0, 0.0));
        channel.dispatch(&mut tree, &mut event);
        assert!(!event.captured);
    }
}
