// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arrow-key navigation over a 4×4 grid, printed to stdout.
//!
//! Builds an in-memory document, walks a fixed input script through the
//! engine, and prints every event the UI layer would receive: focus
//! changes, overlay publications with per-direction chevron hints, and the
//! boundary at the grid's edge.

use kurbo::{Rect, Size};
use wayfind_document::mem::MemDocument;
use wayfind_document::Document;
use wayfind_engine::{Config, Direction, Engine, EngineEvent};

fn main() {
    let mut doc = MemDocument::new(Size::new(800.0, 600.0));
    for row in 0..4 {
        for col in 0..4 {
            let button = doc.create_element("button");
            doc.append_child(doc.root(), button);
            let (x, y) = (f64::from(col) * 120.0, f64::from(row) * 80.0);
            doc.set_rect(button, Rect::new(x, y, x + 100.0, y + 60.0));
            doc.set_text(button, &format!("cell {row}x{col}"));
        }
    }

    let mut engine = Engine::new(Config {
        wrap_navigation: true,
        ..Config::default()
    });
    let count = engine.refresh_now(&doc, 0);
    println!("registry holds {count} focusables");

    let script = [
        Direction::RIGHT,
        Direction::RIGHT,
        Direction::DOWN,
        Direction::LEFT,
        Direction::UP,
        Direction::UP, // top edge: boundary
        Direction::RIGHT,
        Direction::RIGHT,
        Direction::RIGHT, // right edge: wraps to the row start
    ];

    let mut now = 0_u64;
    for direction in script {
        now += 100;
        let moved = engine.move_in_direction(&mut doc, direction, now);
        println!("move {:>5}: {}", direction.name, if moved { "ok" } else { "blocked" });
        engine.run_frame(&mut doc, now + 16);
        engine.run_timers(&mut doc, now + 16);

        for event in engine.take_events() {
            match event {
                EngineEvent::FocusChanged { to, pass, .. } => {
                    println!("  focus -> {:?} (pass {pass})", to.text.as_deref().unwrap_or("?"));
                }
                EngineEvent::OverlayUpdate { rect, hints, .. } => {
                    let arrows: String = ["up", "down", "left", "right"]
                        .iter()
                        .zip(hints.iter())
                        .filter(|(_, hint)| hint.is_some())
                        .map(|(name, _)| format!("{name} "))
                        .collect();
                    println!("  overlay at {rect:?}, chevrons: {}", arrows.trim_end());
                }
                EngineEvent::Boundary { direction, .. } => {
                    println!("  boundary: no candidate toward {direction}");
                }
                EngineEvent::OverlayHidden => println!("  overlay hidden"),
                EngineEvent::DirectionDead { direction } => {
                    println!("  chevron {direction} flashes disabled");
                }
                EngineEvent::DirectionReset { direction } => {
                    println!("  chevron {direction} back to idle");
                }
            }
        }
    }
}
