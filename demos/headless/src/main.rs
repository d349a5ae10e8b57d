// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless trellis scene.
//!
//! Runs one simulated second at 60 Hz on a manual clock: a slider node is
//! tweened across the scene whenever a touch zone is pressed, a pair of
//! timeouts log their progress, and every frame is traced twice, once as
//! human-readable lines on stdout and once into a binary recording. The
//! recording is exported as a Chrome trace at the end.
//!
//! Run with `RUST_LOG=debug` to see the scene's own log output.
//!
//! ```text
//! cargo run -p headless_demo
//! ```
//!
//! Open `trace.json` in `chrome://tracing` or <https://ui.perfetto.dev>.

use std::cell::{Cell, RefCell};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::rc::Rc;

use glam::Vec3;
use trellis_core::color::Color;
use trellis_core::component::{
    Bounds, Timeline, Tint, TouchZone, TouchZoneConfig, ZoneEventKind,
};
use trellis_core::easing::EaseType;
use trellis_core::scene::Scene;
use trellis_core::time::{Duration, HostTime};
use trellis_core::trace::{
    CallbackFaultEvent, DrawOrderEvent, FrameBeginEvent, PhaseBeginEvent, PhaseEndEvent,
    TimeoutFiredEvent, TraceSink, Tracer,
};
use trellis_core::tween::Tween;
use trellis_debug::pretty::PrettyPrintSink;
use trellis_debug::recorder::RecorderSink;
use trellis_harness::{RecordingRenderer, TouchScript};

/// 60 Hz.
const FRAME: Duration = Duration(16_666_667);
const FRAMES: usize = 60;

/// Forwards every event to a pretty printer and a recorder.
struct Tee<'a> {
    pretty: &'a mut PrettyPrintSink,
    recorder: &'a mut RecorderSink,
}

impl TraceSink for Tee<'_> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.pretty.on_frame_begin(e);
        self.recorder.on_frame_begin(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.pretty.on_phase_begin(e);
        self.recorder.on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.pretty.on_phase_end(e);
        self.recorder.on_phase_end(e);
    }

    fn on_timeout_fired(&mut self, e: &TimeoutFiredEvent<'_>) {
        self.pretty.on_timeout_fired(e);
        self.recorder.on_timeout_fired(e);
    }

    fn on_callback_fault(&mut self, e: &CallbackFaultEvent<'_>) {
        self.pretty.on_callback_fault(e);
        self.recorder.on_callback_fault(e);
    }

    fn on_draw_order(&mut self, e: &DrawOrderEvent) {
        self.pretty.on_draw_order(e);
        self.recorder.on_draw_order(e);
    }
}

fn build_scene(scene: &mut Scene) {
    let pressed = Rc::new(Cell::new(false));

    // A 40x40 button near the origin.
    let button = scene.add_new_node();
    scene
        .node_mut(button)
        .transform_mut()
        .set_translation(Vec3::new(20.0, 20.0, 0.0));
    let tree = scene.tree_mut();
    tree.add_component(button, Bounds::new(Vec3::ZERO, Vec3::new(40.0, 40.0, 0.0)));
    tree.add_component(button, Tint::new(Color::new(0.2, 0.6, 1.0, 1.0)));
    tree.add_component(button, TouchZone::new(TouchZoneConfig::default()));
    let flag = Rc::clone(&pressed);
    tree.component::<TouchZone>(button).events().connect(move |e| {
        log::info!("button {:?} at {:?}", e.kind, e.local_position);
        if e.kind == ZoneEventKind::Press {
            flag.set(true);
        }
    });

    // The slider picks up the press on its next update and slides right.
    let slider = scene.add_new_node();
    let x = Rc::new(RefCell::new(0.0_f32));
    let tween = Tween::new(0.0_f32, 200.0, EaseType::ExpoInOut)
        .with_name("slide")
        .with_on_done(|| log::info!("slide finished"))
        .into_ref();
    tween.borrow_mut().bind(&x);

    let timeline = scene.tree_mut().component::<Timeline>(slider);
    timeline.started.connect(|_| log::info!("slider timeline started"));
    timeline.done.connect(|_| log::info!("slider timeline idle"));

    scene.node_mut(slider).set_update_fn(move |cx| {
        if pressed.replace(false) {
            tween
                .borrow_mut()
                .start_now_for(cx.now, Duration::from_millis(400));
            cx.tree.component::<Timeline>(cx.node).add(&tween);
        }
        let x = *x.borrow();
        cx.tree
            .node_mut(cx.node)
            .transform_mut()
            .set_translation(Vec3::new(x, 100.0, 0.0));
    });
}

fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let clock = trellis_core::clock::ManualClock::new();
    let mut scene = Scene::build("headless", clock.clone(), build_scene);
    scene.set_timeout(
        Duration::from_millis(250),
        || log::info!("a quarter second in"),
        Some("quarter"),
    );
    scene.set_timeout(
        Duration::from_millis(750),
        || log::info!("three quarters in"),
        None,
    );

    let script = TouchScript::new()
        .every(Duration::from_millis(80))
        .press(30.0, 30.0)
        .drag(35.0, 32.0)
        .drag(90.0, 90.0)
        .release(90.0, 90.0);
    let mut pending = script.events().iter().copied().peekable();

    let mut renderer = RecordingRenderer::new();
    let mut pretty = PrettyPrintSink::new(Box::new(stdout()));
    let mut recorder = RecorderSink::new();
    let mut captured = 0_usize;
    {
        let mut tee = Tee {
            pretty: &mut pretty,
            recorder: &mut recorder,
        };
        let mut tracer = Tracer::new(&mut tee);
        for _ in 0..FRAMES {
            clock.advance(FRAME);
            let now = scene.now();
            while let Some(mut event) = pending.next_if(|e| e.time <= now) {
                scene.handle_touch_event_traced(&mut event, &mut tracer);
                if event.captured {
                    captured += 1;
                }
            }
            scene.update_traced(&mut tracer);
            scene.draw_traced(&mut renderer, &mut tracer);
        }
    }

    let end = scene.now();
    println!(
        "\nRan {FRAMES} frames to {:.1}ms: {captured} of {} touches captured, {} nodes drawn, matrix stack balanced: {}",
        end.saturating_duration_since(HostTime::ZERO).as_millis_f64(),
        script.len(),
        scene.draw_order().len(),
        renderer.is_balanced(),
    );

    let path = "trace.json";
    let mut writer = BufWriter::new(File::create(path)?);
    trellis_debug::chrome::export(recorder.as_bytes(), &mut writer)?;
    writer.flush()?;
    println!("Wrote {path} ({} bytes recorded)", recorder.as_bytes().len());
    Ok(())
}
