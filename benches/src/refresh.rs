// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Full-refresh throughput over a 1,000-element document.
//!
//! Run with `cargo run --release -p wayfind_benches --bin refresh`. Prints
//! per-iteration timing and flags iterations exceeding the engine's
//! slow-refresh warning threshold.

use std::time::Instant;

use kurbo::{Rect, Size};
use wayfind_document::mem::MemDocument;
use wayfind_document::Document;
use wayfind_engine::{Config, Engine};

const ELEMENTS: usize = 1_000;
const ITERATIONS: u32 = 50;

fn build_document() -> MemDocument {
    let mut doc = MemDocument::new(Size::new(1_920.0, 1_080.0));
    for i in 0..ELEMENTS {
        let button = doc.create_element("button");
        doc.append_child(doc.root(), button);
        let col = (i % 10) as f64;
        let row = (i / 10) as f64;
        doc.set_rect(
            button,
            Rect::new(col * 100.0, row * 50.0, col * 100.0 + 80.0, row * 50.0 + 40.0),
        );
    }
    doc
}

fn main() {
    let doc = build_document();
    let config = Config::default();
    let warn_at = config.slow_refresh_warn_ms;
    let mut engine: Engine<wayfind_document::mem::NodeId> = Engine::new(config);

    // Warm-up pass, also validates the expected focusable count.
    let found = engine.refresh_now(&doc, 0);
    assert_eq!(found, ELEMENTS, "every element should be focusable");

    let mut total_ms = 0.0_f64;
    let mut worst_ms = 0.0_f64;
    let mut slow = 0_u32;
    for i in 0..ITERATIONS {
        let start = Instant::now();
        let found = engine.refresh_now(&doc, u64::from(i));
        let elapsed_ms = start.elapsed().as_secs_f64() * 1_000.0;

        assert_eq!(found, ELEMENTS);
        total_ms += elapsed_ms;
        worst_ms = worst_ms.max(elapsed_ms);
        if elapsed_ms > warn_at as f64 {
            slow += 1;
        }
    }

    println!(
        "full refresh over {ELEMENTS} elements: avg {:.3} ms, worst {:.3} ms over {ITERATIONS} iterations",
        total_ms / f64::from(ITERATIONS),
        worst_ms,
    );
    if slow > 0 {
        println!("{slow} iteration(s) exceeded the {warn_at} ms slow-refresh threshold");
    }
}
