// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in drawing components against a recording renderer.

use glam::{Mat4, Vec3};
use kurbo::{Rect, Size};
use trellis_core::color::Color;
use trellis_core::component::{Image, Tint};
use trellis_core::render::{Renderer, Texture};
use trellis_core::resource::ResourceCache;
use trellis_harness::SceneDriver;

struct Sprite(Size);

impl Texture for Sprite {
    fn is_allocated(&self) -> bool {
        true
    }

    fn size(&self) -> Size {
        self.0
    }
}

const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);

#[test]
fn images_draw_under_parent_tint_and_transform() {
    let cache = ResourceCache::shared();
    cache
        .borrow_mut()
        .insert("dot", Sprite(Size::new(8.0, 8.0)));

    let mut driver = SceneDriver::build("sprites", |scene| {
        let group = scene.add_new_node();
        scene
            .node_mut(group)
            .transform_mut()
            .set_translation(Vec3::new(10.0, 0.0, 0.0));
        let tree = scene.tree_mut();
        tree.add_component(group, Tint::new(RED));
        let sprite = tree.add_new_child(group);
        tree.node_mut(sprite)
            .transform_mut()
            .set_translation(Vec3::new(0.0, 5.0, 0.0));
        tree.add_component(sprite, Image::new(&cache, "dot", Rect::new(0.0, 0.0, 8.0, 8.0)));
        let missing = tree.add_new_child(group);
        tree.add_component(missing, Image::new(&cache, "absent", Rect::ZERO));
        let plain = scene.add_new_node();
        scene
            .tree_mut()
            .add_component(plain, Image::new(&cache, "dot", Rect::new(0.0, 0.0, 8.0, 8.0)));
    });

    driver.frame();

    let draws = driver.renderer().draws();
    assert_eq!(draws.len(), 2, "the missing texture is skipped");
    assert_eq!(draws[0].color, RED);
    assert_eq!(
        draws[0].model,
        Mat4::from_translation(Vec3::new(10.0, 5.0, 0.0))
    );
    assert_eq!(draws[0].texture_size, Size::new(8.0, 8.0));
    assert_eq!(draws[1].color, Color::WHITE, "the tint ends with its subtree");
    assert_eq!(draws[1].model, Mat4::IDENTITY);

    assert!(driver.renderer().is_balanced());
    assert_eq!(driver.renderer().global_color(), Color::WHITE);
}

#[test]
fn hidden_subtrees_draw_nothing() {
    let cache = ResourceCache::shared();
    cache
        .borrow_mut()
        .insert("dot", Sprite(Size::new(1.0, 1.0)));

    let mut driver = SceneDriver::new("hidden");
    let scene = driver.scene_mut();
    let node = scene.add_new_node();
    scene
        .tree_mut()
        .add_component(node, Image::new(&cache, "dot", Rect::new(0.0, 0.0, 1.0, 1.0)));
    scene.node_mut(node).set_draw_enabled(false);

    driver.frame();
    assert!(driver.renderer().draws().is_empty());

    driver.scene_mut().node_mut(node).set_draw_enabled(true);
    driver.frame();
    assert_eq!(driver.renderer().draws().len(), 1);
}
