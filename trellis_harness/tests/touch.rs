// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch zones receiving scripted input through a scene.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use trellis_core::clock::ManualClock;
use trellis_core::component::{
    Bounds, ComponentType, TouchZone, TouchZoneConfig, TouchZoneState, ZoneEventKind,
};
use trellis_core::node::NodeId;
use trellis_core::scene::Scene;
use trellis_harness::TouchScript;

type Seen = Rc<RefCell<Vec<ZoneEventKind>>>;

/// Adds a 10x10 zone at `offset` under the root and records its events.
fn add_zone(scene: &mut Scene, offset: Vec3, config: TouchZoneConfig) -> (NodeId, Seen) {
    let node = scene.add_new_node();
    scene.node_mut(node).transform_mut().set_translation(offset);
    let tree = scene.tree_mut();
    tree.add_component(node, Bounds::new(Vec3::ZERO, Vec3::new(10.0, 10.0, 0.0)));
    tree.add_component(node, TouchZone::new(config));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    tree.component::<TouchZone>(node)
        .events()
        .connect(move |e| sink.borrow_mut().push(e.kind));
    (node, seen)
}

fn zone_state(scene: &Scene, node: NodeId) -> Option<TouchZoneState> {
    scene
        .tree()
        .get_component::<TouchZone>(node)
        .map(TouchZone::state)
}

#[test]
fn press_then_drag_off_with_losing_focus() {
    let mut scene = Scene::new("zone", ManualClock::new());
    let (node, seen) = add_zone(
        &mut scene,
        Vec3::ZERO,
        TouchZoneConfig {
            allow_losing_focus: true,
            ..Default::default()
        },
    );

    let pressed = TouchScript::new().press(5.0, 5.0).play(&mut scene);
    assert!(pressed[0].captured, "zone consumed the press");
    assert_eq!(zone_state(&scene, node), Some(TouchZoneState::Active));
    assert_eq!(*seen.borrow(), [ZoneEventKind::Press]);

    TouchScript::new().drag(50.0, 50.0).play(&mut scene);
    assert_eq!(zone_state(&scene, node), Some(TouchZoneState::Inactive));
    assert_eq!(*seen.borrow(), [ZoneEventKind::Press, ZoneEventKind::DragOff]);

    let released = TouchScript::new().release(60.0, 60.0).play(&mut scene);
    assert!(!released[0].captured);
    assert_eq!(zone_state(&scene, node), Some(TouchZoneState::Inactive));
    assert_eq!(
        seen.borrow().len(),
        2,
        "release while inactive reports nothing"
    );
}

#[test]
fn full_gesture_inside_the_zone() {
    let mut scene = Scene::new("gesture", ManualClock::new());
    let (node, seen) = add_zone(&mut scene, Vec3::new(100.0, 100.0, 0.0), TouchZoneConfig::default());

    let played = TouchScript::new()
        .press(101.0, 101.0)
        .drag(105.0, 105.0)
        .drag(200.0, 200.0)
        .release(200.0, 200.0)
        .play(&mut scene);

    assert_eq!(
        *seen.borrow(),
        [
            ZoneEventKind::Press,
            ZoneEventKind::DragInside,
            ZoneEventKind::DragOff,
            ZoneEventKind::Release,
        ],
        "focus is kept while dragged off"
    );
    let captured: Vec<bool> = played.iter().map(|e| e.captured).collect();
    assert_eq!(captured, [true, true, false, true]);
    assert_eq!(zone_state(&scene, node), Some(TouchZoneState::Inactive));
}

#[test]
fn capturing_zone_shadows_later_groups() {
    let mut scene = Scene::new("groups", ManualClock::new());
    let (_, back) = add_zone(
        &mut scene,
        Vec3::ZERO,
        TouchZoneConfig {
            group: 1,
            ..Default::default()
        },
    );
    let (_, front) = add_zone(
        &mut scene,
        Vec3::ZERO,
        TouchZoneConfig {
            group: -1,
            ..Default::default()
        },
    );
    let (_, spy) = add_zone(
        &mut scene,
        Vec3::ZERO,
        TouchZoneConfig {
            group: 2,
            capture: false,
            ..Default::default()
        },
    );

    TouchScript::new().press(5.0, 5.0).play(&mut scene);
    assert_eq!(*front.borrow(), [ZoneEventKind::Press]);
    assert!(back.borrow().is_empty(), "already captured");
    assert_eq!(
        *spy.borrow(),
        [ZoneEventKind::Press],
        "non-capturing zones still see captured events"
    );
}

#[test]
fn zones_stop_listening_when_removed() {
    let mut scene = Scene::new("removal", ManualClock::new());
    let (node, seen) = add_zone(&mut scene, Vec3::ZERO, TouchZoneConfig::default());
    scene.update();
    assert!(scene.touch_events().is_subscribed(node, TouchZone::TAG));

    assert!(scene.remove_node(node));
    assert!(!scene.touch_events().is_subscribed(node, TouchZone::TAG));
    TouchScript::new().press(5.0, 5.0).play(&mut scene);
    assert!(seen.borrow().is_empty());

    scene.add_node(node);
    TouchScript::new().press(5.0, 5.0).play(&mut scene);
    assert_eq!(*seen.borrow(), [ZoneEventKind::Press], "subscribed again");
}

#[test]
fn closures_and_zones_share_the_channel() {
    let mut scene = Scene::new("mixed", ManualClock::new());
    let (_, seen) = add_zone(&mut scene, Vec3::ZERO, TouchZoneConfig::default());
    let misses = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&misses);
    scene.touch_events().connect_in_group(10, move |e| {
        if !e.captured {
            sink.borrow_mut().push(e.position);
        }
    });

    TouchScript::new()
        .press(5.0, 5.0)
        .release(5.0, 5.0)
        .press(50.0, 50.0)
        .play(&mut scene);
    assert_eq!(*seen.borrow(), [ZoneEventKind::Press, ZoneEventKind::Release]);
    assert_eq!(misses.borrow().len(), 1, "only the press outside fell through");
}
