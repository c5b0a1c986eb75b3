// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine events and serialized element descriptors.
//!
//! The engine never calls into the host; it appends events here and the host
//! drains them with [`crate::Engine::take_events`] after each call or pump.
//! Hosts typically translate [`EngineEvent::Boundary`] into the
//! `spatialNavigationExit` document event (and a native [`crate::bridge`]
//! message when a bridge is attached), and feed the overlay events to
//! whatever draws the focus ring and chevrons.

use alloc::string::{String, ToString};

use kurbo::Rect;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs;

use wayfind_document::Document;
use wayfind_score::DirName;

/// Maximum text excerpt carried in a descriptor.
pub const DESCRIPTOR_TEXT_MAX: usize = 100;

/// A serialized, DOM-independent description of one element.
///
/// Descriptors are stable across DOM recycling as long as the replacement
/// element renders the same content, which makes them usable both for
/// reporting (bridge messages) and best-effort re-resolution after a
/// virtual-list swap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementDescriptor {
    /// Tag name, as reported by the document.
    pub tag: String,
    /// The `id` attribute.
    pub id: Option<String>,
    /// The `class` attribute, verbatim.
    pub class: Option<String>,
    /// Up to [`DESCRIPTOR_TEXT_MAX`] characters of own text.
    pub text: Option<String>,
    /// Rounded layout rect `(x, y, w, h)` at capture time.
    pub rect: (i32, i32, i32, i32),
    /// The `aria-label` attribute.
    pub aria_label: Option<String>,
}

impl ElementDescriptor {
    /// Capture a descriptor for `el`.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "layout coordinates fit i32 after rounding"
    )]
    pub fn capture<D: Document>(doc: &D, el: D::Handle) -> Self {
        let rect = doc.rect(el);
        Self {
            tag: doc.tag_name(el).unwrap_or("").to_string(),
            id: doc.attribute(el, "id").map(str::to_string),
            class: doc.attribute(el, "class").map(str::to_string),
            text: doc.text_excerpt(el, DESCRIPTOR_TEXT_MAX),
            rect: (
                rect.x0.round() as i32,
                rect.y0.round() as i32,
                rect.width().round() as i32,
                rect.height().round() as i32,
            ),
            aria_label: doc.attribute(el, "aria-label").map(str::to_string),
        }
    }

    /// Whether `el` still answers to this descriptor.
    ///
    /// The rect is deliberately not compared; recycled elements move. Every
    /// identity-ish field that was captured must match.
    pub fn matches<D: Document>(&self, doc: &D, el: D::Handle) -> bool {
        if !doc
            .tag_name(el)
            .is_some_and(|t| t.eq_ignore_ascii_case(&self.tag))
        {
            return false;
        }
        if self.id.as_deref() != doc.attribute(el, "id") {
            return false;
        }
        if self.class.as_deref() != doc.attribute(el, "class") {
            return false;
        }
        if self.aria_label.as_deref() != doc.attribute(el, "aria-label") {
            return false;
        }
        match &self.text {
            Some(text) => doc
                .text_excerpt(el, DESCRIPTOR_TEXT_MAX)
                .is_some_and(|t| &t == text),
            None => true,
        }
    }
}

/// One observable engine decision.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent<H> {
    /// Focus moved (or was programmatically applied) to a new entry.
    FocusChanged {
        /// The element now holding focus.
        target: H,
        /// Descriptor of the element focus left, when known.
        from: Option<ElementDescriptor>,
        /// Descriptor of the element focus landed on.
        to: ElementDescriptor,
        /// The arrow that caused the move; `None` for programmatic focus.
        direction: Option<DirName>,
        /// Scoring pass that accepted the winner ([`crate::WRAP_PASS`] for
        /// wrap-around moves, `0` for programmatic focus).
        pass: i8,
        /// Host time of the decision.
        timestamp: u64,
    },
    /// A move had no candidate: the engine hit a boundary.
    Boundary {
        /// The requested direction.
        direction: DirName,
        /// Whether the origin sits in a group navigation cannot exit.
        in_trap: bool,
        /// Id of the trapping group.
        trap_id: Option<String>,
        /// Direction that would escape the trap, when one is known.
        escape_key: Option<DirName>,
        /// Host time of the decision.
        timestamp: u64,
    },
    /// The overlay should be (re)drawn on `target`.
    OverlayUpdate {
        /// The focused element the overlay frames.
        target: H,
        /// Its rect at publication time.
        rect: Rect,
        /// Per-direction next-target rects, indexed by [`DirName::index`];
        /// `None` leaves that chevron in its base state.
        hints: [Option<Rect>; 4],
    },
    /// The overlay and all chevrons should return to their base state.
    OverlayHidden,
    /// A direction was announced dead; the UI shows its chevron disabled.
    DirectionDead {
        /// The dead direction.
        direction: DirName,
    },
    /// A dead-direction mark decayed back to the base state.
    DirectionReset {
        /// The direction to clear.
        direction: DirName,
    },
}
