// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree structure, update counts, draw order and scene-space transforms,
//! exercised through a whole scene.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec3;
use trellis_core::clock::ManualClock;
use trellis_core::component::{
    Component, ComponentError, ComponentTag, ComponentType, UpdateContext,
};
use trellis_core::node::NodeId;
use trellis_core::render::{MatrixKind, Renderer};
use trellis_core::scene::Scene;
use trellis_harness::{RecordingRenderer, SceneDriver};

struct Counter(Rc<Cell<u32>>);

impl Component for Counter {
    fn update(&mut self, _cx: &mut UpdateContext<'_>) {
        self.0.set(self.0.get() + 1);
    }
}

impl ComponentType for Counter {
    const TAG: ComponentTag = ComponentTag("test.counter");

    fn construct() -> Result<Self, ComponentError> {
        Err(ComponentError::ConstructionFailed(Self::TAG))
    }
}

#[test]
fn detach_clears_parent_and_scene_of_whole_subtree() {
    let mut scene = Scene::new("detach", ManualClock::new());
    let a = scene.add_new_node();
    let b = scene.tree_mut().add_new_child(a);
    let c = scene.tree_mut().add_new_child(b);
    for node in [a, b, c] {
        assert_eq!(scene.node(node).scene(), Some(scene.id()), "{node:?} joined");
    }

    scene.tree_mut().detach(a);

    assert_eq!(scene.node(a).parent(), None);
    for node in [a, b, c] {
        assert_eq!(scene.node(node).scene(), None, "{node:?} left the scene");
    }
    assert_eq!(scene.node(b).parent(), Some(a), "subtree stays intact");
    assert_eq!(scene.node(c).parent(), Some(b), "subtree stays intact");
    assert!(!scene.has_node(a));
    assert!(scene.tree().is_alive(c), "detached nodes live until destroyed");
}

#[test]
fn update_calls_match_enabled_nodes_with_components() {
    let count = Rc::new(Cell::new(0));
    let mut scene = Scene::new("counts", ManualClock::new());
    let tree_root = scene.root();
    let a = scene.add_new_node();
    let b = scene.add_new_node();
    let plain = scene.add_new_node();
    let tree = scene.tree_mut();
    let a1 = tree.add_new_child(a);
    let b1 = tree.add_new_child(b);
    let _plain_child = tree.add_new_child(plain);
    for node in [a, a1, b, b1] {
        tree.add_component(node, Counter(Rc::clone(&count)));
    }
    tree.node_mut(b).set_update_enabled(false);
    assert!(tree.node(tree_root).is_update_enabled());

    scene.update();
    assert_eq!(count.get(), 2, "a and a1; b's subtree is pruned");

    scene.node_mut(b).set_update_enabled(true);
    scene.update();
    assert_eq!(count.get(), 2 + 4);
}

#[test]
fn draw_indices_follow_pre_order() {
    let mut driver = SceneDriver::new("order");
    let scene = driver.scene_mut();
    let root = scene.root();
    let a = scene.add_new_node();
    let hidden = scene.add_new_node();
    let b = scene.add_new_node();
    let tree = scene.tree_mut();
    let a1 = tree.add_new_child(a);
    let a2 = tree.add_new_child(a);
    let a1x = tree.add_new_child(a1);
    let secret = tree.add_new_child(hidden);
    let b1 = tree.add_new_child(b);
    tree.node_mut(hidden).set_draw_enabled(false);

    driver.frame();

    let expected: Vec<NodeId> = vec![root, a, a1, a1x, a2, hidden, b, b1];
    assert_eq!(driver.scene().draw_order(), expected.as_slice());
    for (i, &node) in expected.iter().enumerate() {
        assert_eq!(
            driver.scene().cached_draw_index(node),
            Some(i),
            "{node:?} drawn {i}th"
        );
    }
    assert_eq!(
        driver.scene().cached_draw_index(secret),
        None,
        "children of a hidden node are not drawn"
    );

    let pre_order = driver.scene().tree().descendants(root);
    let drawn: Vec<NodeId> = pre_order.into_iter().filter(|&n| n != secret).collect();
    assert_eq!(drawn, expected, "draw order is the pruned pre-order walk");
    assert!(driver.renderer().is_balanced());
}

#[test]
fn draw_index_recomputes_after_restructuring() {
    let mut driver = SceneDriver::new("restructure");
    let a = driver.scene_mut().add_new_node();
    let b = driver.scene_mut().add_new_node();
    driver.frame();
    assert_eq!(driver.scene().cached_draw_index(b), Some(2));

    driver.scene_mut().insert_node(0, b);
    assert_eq!(
        driver.scene().cached_draw_index(b),
        None,
        "stale after the move"
    );
    assert_eq!(driver.scene_mut().draw_index(b), Some(1));
    assert_eq!(driver.scene_mut().draw_index(a), Some(2));
}

#[test]
fn scene_transform_composes_parent_first() {
    let mut scene = Scene::new("transform", ManualClock::new());
    let parent = scene.add_new_node();
    let child = scene.tree_mut().add_new_child(parent);
    scene
        .node_mut(parent)
        .transform_mut()
        .set_translation(Vec3::new(0.0, 1.0, 0.0));
    scene
        .node_mut(child)
        .transform_mut()
        .set_translation(Vec3::new(1.0, 0.0, 0.0));

    let tree = scene.tree();
    assert_eq!(tree.local_to_scene(child, Vec3::ZERO), Vec3::new(1.0, 1.0, 0.0));
    assert_eq!(
        tree.scene_transform(child).translation(),
        Vec3::new(1.0, 1.0, 0.0)
    );
    assert_eq!(tree.scene_to_local(child, Vec3::new(1.0, 1.0, 0.0)), Vec3::ZERO);
}

#[test]
fn draw_walk_applies_node_transforms() {
    let mut scene = Scene::new("model", ManualClock::new());
    let a = scene.add_new_node();
    scene
        .node_mut(a)
        .transform_mut()
        .set_translation(Vec3::new(3.0, 4.0, 0.0));
    let seen = Rc::new(Cell::new(Vec3::ZERO));
    let out = Rc::clone(&seen);
    scene.node_mut(a).set_draw_fn(move |cx| {
        let model = cx.renderer.matrix(MatrixKind::Model);
        out.set(model.transform_point3(Vec3::ZERO));
    });

    let mut renderer = RecordingRenderer::new();
    scene.draw(&mut renderer);
    assert_eq!(seen.get(), Vec3::new(3.0, 4.0, 0.0));
    assert!(renderer.is_balanced());
    assert_eq!(renderer.max_depth(), 2, "root and a each pushed once");
}
