// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus recovery after a virtual list recycles its rows.
//!
//! Simulates what a virtualized scroller does to the DOM: the focused row
//! element is destroyed and a different element is created in (roughly) the
//! same place. Identity-based recovery fails, and the engine falls back to
//! the position hint captured before the mutation flush touched the
//! registry.

use kurbo::{Rect, Size};
use wayfind_document::Document as _;
use wayfind_document::mem::{MemDocument, NodeId};
use wayfind_engine::{Config, Engine};

fn make_row(doc: &mut MemDocument, list: NodeId, index: usize, label: &str) -> NodeId {
    let row = doc.create_element("button");
    doc.append_child(list, row);
    let y = index as f64 * 50.0;
    doc.set_rect(row, Rect::new(0.0, y, 300.0, y + 40.0));
    doc.set_text(row, label);
    row
}

fn main() {
    let mut doc = MemDocument::new(Size::new(800.0, 600.0));
    let list = doc.create_element("div");
    doc.append_child(doc.root(), list);
    let _ = doc.set_attribute(list, "class", "virtual-list");

    let rows: Vec<NodeId> = (0..8)
        .map(|i| make_row(&mut doc, list, i, &format!("row {i}")))
        .collect();

    let mut engine = Engine::new(Config {
        observe_virtual_containers: true,
        virtual_container_selectors: vec![".virtual-list".into()],
        ..Config::default()
    });
    engine.refresh_now(&doc, 0);
    assert!(engine.focus_element(&mut doc, rows[3], 0));
    println!("focused: {:?}", doc.text_excerpt(rows[3], 32));

    // The renderer swaps row 3 for a freshly created element at the same
    // offset, the way recycling list views do on scroll.
    let mut records = Vec::new();
    records.extend(doc.remove_subtree(rows[3]));
    doc.blur();
    let replacement = make_row(&mut doc, list, 3, "row 3 (recycled)");
    records.push(doc.set_attribute(replacement, "data-recycled", "true"));
    records.push(doc.append_child(list, replacement));

    let now = 500;
    engine.record_mutations(records, now);
    println!("mutations buffered; flushing after the debounce...");
    engine.run_timers(&mut doc, now + 100);

    let focused = doc.active_element().expect("recovery should land somewhere");
    println!(
        "recovered onto: {:?} (index {:?})",
        doc.text_excerpt(focused, 32),
        engine.current_index(),
    );
    assert_eq!(
        doc.text_excerpt(focused, 32).as_deref(),
        Some("row 3 (recycled)"),
        "the position hint should land on the row occupying the old slot",
    );
}
