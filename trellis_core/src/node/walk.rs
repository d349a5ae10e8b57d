// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The update and draw tree walks.
//!
//! Both walks are pre-order. Per node, the fixed order is:
//!
//! 1. `will_*` signal
//! 2. every component, in tag order
//! 3. the node hook (closure if set, else [`NodeBehavior`](super::NodeBehavior))
//! 4. `will_*_children` signal
//! 5. children, in child-list order
//! 6. `did_*_children` signal
//! 7. `did_*` signal
//!
//! The draw walk additionally runs each component's `will_draw` before step 2
//! and `did_draw` before step 7, and brackets the node in a [`MatrixScope`]
//! holding its local matrix. A disabled flag prunes the node's whole subtree.
//!
//! Children are snapshotted before recursion; a child that was destroyed or
//! moved elsewhere by an earlier sibling's hooks is skipped.

use alloc::vec::Vec;

use super::{NodeId, NodeSignals, NodeTree};
use crate::component::{ComponentTag, DrawContext, UpdateContext};
use crate::render::{MatrixKind, MatrixScope, Renderer};
use crate::signal::Signal;
use crate::time::HostTime;

impl NodeTree {
    /// Runs the update walk over `node`'s subtree.
    pub fn update_tree(&mut self, node: NodeId, now: HostTime) {
        let Some(n) = self.get_mut(node) else {
            return;
        };
        if !n.update_enabled {
            return;
        }
        n.signals.will_update.emit(&node);

        for tag in self.tags(node) {
            self.with_component(node, tag, |component, tree| {
                component.update(&mut UpdateContext { tree, node, now });
            });
        }
        self.run_update_hook(node, now);

        self.emit(node, |s| &mut s.will_update_children);
        for child in self.child_snapshot(node) {
            if self.is_parent_of(node, child) {
                self.update_tree(child, now);
            }
        }
        self.emit(node, |s| &mut s.did_update_children);
        self.emit(node, |s| &mut s.did_update);
    }

    /// Runs the draw walk over `node`'s subtree without assigning draw
    /// indices, e.g. to render a detached subtree offscreen.
    pub fn draw_tree(&mut self, node: NodeId, now: HostTime, renderer: &mut dyn Renderer) {
        self.draw_subtree(node, now, renderer, None);
    }

    /// Draw walk. When `order` is given, every visited node that belongs to
    /// a scene is appended to it and receives its position as draw index,
    /// before its draw flag is checked.
    pub(crate) fn draw_subtree(
        &mut self,
        node: NodeId,
        now: HostTime,
        renderer: &mut dyn Renderer,
        mut order: Option<&mut Vec<NodeId>>,
    ) {
        let Some(n) = self.get(node) else {
            return;
        };
        if let Some(order) = order.as_deref_mut() {
            if n.scene.is_some() {
                let index = order.len();
                order.push(node);
                self.set_draw_index(node, index);
            }
        }
        let n = self.node(node);
        if !n.draw_enabled {
            return;
        }
        let local = n.transform.matrix();

        let mut scope = MatrixScope::model(renderer);
        scope.mult_matrix(MatrixKind::Model, local);

        self.emit(node, |s| &mut s.will_draw);
        let tags = self.tags(node);
        for &tag in &tags {
            self.with_component(node, tag, |component, tree| {
                component.will_draw(&mut DrawContext {
                    tree,
                    node,
                    now,
                    renderer: &mut *scope,
                });
            });
        }
        for &tag in &tags {
            self.with_component(node, tag, |component, tree| {
                component.draw(&mut DrawContext {
                    tree,
                    node,
                    now,
                    renderer: &mut *scope,
                });
            });
        }
        self.run_draw_hook(node, now, &mut *scope);

        self.emit(node, |s| &mut s.will_draw_children);
        for child in self.child_snapshot(node) {
            if self.is_parent_of(node, child) {
                self.draw_subtree(child, now, &mut *scope, order.as_deref_mut());
            }
        }
        self.emit(node, |s| &mut s.did_draw_children);

        for tag in self.tags(node) {
            self.with_component(node, tag, |component, tree| {
                component.did_draw(&mut DrawContext {
                    tree,
                    node,
                    now,
                    renderer: &mut *scope,
                });
            });
        }
        self.emit(node, |s| &mut s.did_draw);
    }

    fn tags(&self, node: NodeId) -> Vec<ComponentTag> {
        self.get(node).map(|n| n.component_tags()).unwrap_or_default()
    }

    fn child_snapshot(&self, node: NodeId) -> Vec<NodeId> {
        self.get(node).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn emit(
        &mut self,
        node: NodeId,
        pick: impl FnOnce(&mut NodeSignals) -> &mut Signal<NodeId>,
    ) {
        if let Some(n) = self.get_mut(node) {
            pick(&mut n.signals).emit(&node);
        }
    }

    fn run_update_hook(&mut self, node: NodeId, now: HostTime) {
        let Some(n) = self.get_mut(node) else {
            return;
        };
        if let Some(mut f) = n.update_fn.take() {
            f(&mut UpdateContext {
                tree: self,
                node,
                now,
            });
            if let Some(n) = self.get_mut(node) {
                n.update_fn.get_or_insert(f);
            }
        } else if let Some(mut behavior) = n.behavior.take() {
            behavior.update(&mut UpdateContext {
                tree: self,
                node,
                now,
            });
            if let Some(n) = self.get_mut(node) {
                n.behavior.get_or_insert(behavior);
            }
        }
    }

    fn run_draw_hook(&mut self, node: NodeId, now: HostTime, renderer: &mut dyn Renderer) {
        let Some(n) = self.get_mut(node) else {
            return;
        };
        if let Some(mut f) = n.draw_fn.take() {
            f(&mut DrawContext {
                tree: self,
                node,
                now,
                renderer,
            });
            if let Some(n) = self.get_mut(node) {
                n.draw_fn.get_or_insert(f);
            }
        } else if let Some(mut behavior) = n.behavior.take() {
            behavior.draw(&mut DrawContext {
                tree: self,
                node,
                now,
                renderer,
            });
            if let Some(n) = self.get_mut(node) {
                n.behavior.get_or_insert(behavior);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec;
    use core::cell::RefCell;

    use glam::{Mat4, Vec3};

    use super::*;
    use crate::component::{Component, ComponentError, ComponentType};
    use crate::node::NodeBehavior;
    use crate::render::MatrixStack;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Echo {
        log: Log,
    }

    impl Component for Echo {
        fn update(&mut self, cx: &mut UpdateContext<'_>) {
            let name = String::from(cx.tree.node(cx.node).name());
            self.log.borrow_mut().push(alloc::format!("component {name}"));
        }
    }

    impl ComponentType for Echo {
        const TAG: ComponentTag = ComponentTag("test.echo");

        fn construct() -> Result<Self, ComponentError> {
            Err(ComponentError::ConstructionFailed(Self::TAG))
        }
    }

    fn echoing(tree: &mut NodeTree, name: &str, log: &Log) -> NodeId {
        let id = tree.create_named(name);
        tree.add_component(id, Echo { log: Rc::clone(log) });
        let hook_log = Rc::clone(log);
        let hook_name = String::from(name);
        tree.node_mut(id)
            .set_update_fn(move |_| hook_log.borrow_mut().push(alloc::format!("hook {hook_name}")));
        id
    }

    #[test]
    fn components_run_before_hook_before_children() {
        let log = Log::default();
        let mut tree = NodeTree::new();
        let root = echoing(&mut tree, "root", &log);
        let child = echoing(&mut tree, "child", &log);
        tree.add_child(root, child);

        tree.update_tree(root, HostTime::ZERO);
        assert_eq!(
            *log.borrow(),
            vec!["component root", "hook root", "component child", "hook child"]
        );
    }

    #[test]
    fn disabled_node_prunes_subtree() {
        let log = Log::default();
        let mut tree = NodeTree::new();
        let root = echoing(&mut tree, "root", &log);
        let mid = echoing(&mut tree, "mid", &log);
        let leaf = echoing(&mut tree, "leaf", &log);
        tree.add_child(root, mid);
        tree.add_child(mid, leaf);
        tree.node_mut(mid).set_update_enabled(false);

        tree.update_tree(root, HostTime::ZERO);
        assert_eq!(*log.borrow(), vec!["component root", "hook root"]);
    }

    #[test]
    fn signals_bracket_children() {
        let log = Log::default();
        let mut tree = NodeTree::new();
        let root = tree.create_named("root");
        let child = echoing(&mut tree, "child", &log);
        tree.add_child(root, child);
        let signals = tree.node_mut(root).signals_mut();
        for (label, signal) in [
            ("will", &mut signals.will_update),
            ("will children", &mut signals.will_update_children),
            ("did children", &mut signals.did_update_children),
            ("did", &mut signals.did_update),
        ] {
            let log = Rc::clone(&log);
            signal.connect(move |_| log.borrow_mut().push(String::from(label)));
        }

        tree.update_tree(root, HostTime::ZERO);
        assert_eq!(
            *log.borrow(),
            vec![
                "will",
                "will children",
                "component child",
                "hook child",
                "did children",
                "did"
            ]
        );
    }

    /// Detaches itself on its first update, optionally leaving a successor.
    struct Quitter {
        generation: u32,
        replace: bool,
        returned: Rc<RefCell<Option<bool>>>,
    }

    impl Component for Quitter {
        fn update(&mut self, cx: &mut UpdateContext<'_>) {
            if self.generation > 0 {
                return;
            }
            let removed = cx.tree.remove_component::<Self>(cx.node);
            *self.returned.borrow_mut() = Some(removed.is_some());
            if self.replace {
                cx.tree.add_component(
                    cx.node,
                    Self {
                        generation: 1,
                        replace: false,
                        returned: Rc::clone(&self.returned),
                    },
                );
            }
        }
    }

    impl ComponentType for Quitter {
        const TAG: ComponentTag = ComponentTag("test.quitter");

        fn construct() -> Result<Self, ComponentError> {
            Err(ComponentError::ConstructionFailed(Self::TAG))
        }
    }

    fn quitting(tree: &mut NodeTree, replace: bool) -> (NodeId, Rc<RefCell<Option<bool>>>) {
        let returned = Rc::new(RefCell::new(None));
        let id = tree.create_node();
        tree.add_component(
            id,
            Quitter {
                generation: 0,
                replace,
                returned: Rc::clone(&returned),
            },
        );
        (id, returned)
    }

    #[test]
    fn component_can_remove_itself_during_update() {
        let mut tree = NodeTree::new();
        let (id, returned) = quitting(&mut tree, false);

        tree.update_tree(id, HostTime::ZERO);
        assert_eq!(
            *returned.borrow(),
            Some(false),
            "nothing to hand back while the hook holds the component"
        );
        assert!(
            !tree.has_component::<Quitter>(id),
            "component stays detached after its hook returns"
        );

        tree.update_tree(id, HostTime::ZERO);
        assert!(!tree.has_component::<Quitter>(id), "still gone next frame");
    }

    #[test]
    fn replacement_added_during_update_survives() {
        let mut tree = NodeTree::new();
        let (id, _) = quitting(&mut tree, true);

        tree.update_tree(id, HostTime::ZERO);
        assert_eq!(
            tree.get_component::<Quitter>(id).map(|q| q.generation),
            Some(1),
            "successor kept, original dropped"
        );
    }

    #[derive(Default)]
    struct Spin {
        updates: u32,
        saw_setup: bool,
    }

    impl NodeBehavior for Spin {
        fn setup(&mut self, tree: &mut NodeTree, node: NodeId) {
            self.saw_setup = tree.is_alive(node);
        }

        fn update(&mut self, _cx: &mut UpdateContext<'_>) {
            self.updates += 1;
        }
    }

    #[test]
    fn behavior_hook_runs_unless_overridden() {
        let mut tree = NodeTree::new();
        let id = tree.create_node_with(Spin::default());
        tree.update_tree(id, HostTime::ZERO);
        let spin = tree.node(id).behavior::<Spin>().map(|s| (s.saw_setup, s.updates));
        assert_eq!(spin, Some((true, 1)));

        tree.node_mut(id).set_update_fn(|_| {});
        tree.update_tree(id, HostTime::ZERO);
        assert_eq!(tree.node(id).behavior::<Spin>().map(|s| s.updates), Some(1));
    }

    #[test]
    fn draw_leaves_matrix_stack_balanced() {
        let mut tree = NodeTree::new();
        let root = tree.create_node();
        let child = tree.add_new_child(root);
        let seen = Rc::new(RefCell::new(Mat4::IDENTITY));
        tree.node_mut(root)
            .transform_mut()
            .set_translation(Vec3::new(5.0, 0.0, 0.0));
        let sink = Rc::clone(&seen);
        tree.node_mut(child).set_draw_fn(move |cx| {
            *sink.borrow_mut() = cx.renderer.matrix(MatrixKind::Model);
        });
        // A disabled sibling must not unbalance the stack either.
        let hidden = tree.add_new_child(root);
        tree.node_mut(hidden).set_draw_enabled(false);

        let mut renderer = MatrixStack::new();
        tree.draw_tree(root, HostTime::ZERO, &mut renderer);
        assert!(renderer.is_balanced(), "every push popped");
        assert_eq!(
            *seen.borrow(),
            Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)),
            "child drew under parent transform"
        );
    }
}
