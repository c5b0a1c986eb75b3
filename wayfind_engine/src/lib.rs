// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wayfind Engine: the spatial-navigation state machine.
//!
//! This crate ties the lower layers together into one explicit handle,
//! [`Engine`], that a host threads through every call:
//!
//! - it keeps the focusable [`wayfind_registry::Registry`] fresh from the
//!   mutation, intersection, and scroll observations the host pushes in;
//! - on each arrow input it validates the current focus (recovering through
//!   element identity first and a short-lived geometric [`PositionHint`]
//!   last), asks [`wayfind_score`] for the best successor, and applies focus;
//! - after each successful move it recomputes the per-direction next targets
//!   and coalesces an overlay update onto the next animation frame;
//! - when a move has nowhere to go it reports a boundary instead, suppressing
//!   the overlay and emitting the exit event hosts forward to the page and,
//!   when present, to a native bridge ([`bridge`]).
//!
//! ## Cooperative scheduling
//!
//! The engine never blocks and never reads a clock: every public operation
//! takes `now_ms`, and every delayed behavior (mutation debounce, overlay
//! frames, the no-target decay) lives in a small task queue with coalescing
//! keys ([`scheduler`]). The host pumps the queue from its own event loop:
//!
//! - [`Engine::run_microtasks`] after the current task unwinds,
//! - [`Engine::run_frame`] on each animation frame,
//! - [`Engine::run_timers`] whenever timers may have come due.
//!
//! Everything the engine decides is pushed into an event outbox the host
//! drains with [`Engine::take_events`]; there are no callbacks.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Rect, Size};
//! use wayfind_document::mem::MemDocument;
//! use wayfind_engine::{Config, Engine};
//! use wayfind_score::Direction;
//!
//! let mut doc = MemDocument::new(Size::new(800.0, 600.0));
//! let left = doc.create_element("button");
//! let right = doc.create_element("button");
//! doc.append_child(doc.root(), left);
//! doc.append_child(doc.root(), right);
//! doc.set_rect(left, Rect::new(0.0, 0.0, 40.0, 20.0));
//! doc.set_rect(right, Rect::new(60.0, 0.0, 100.0, 20.0));
//!
//! let mut engine = Engine::new(Config::default());
//! engine.refresh_now(&doc, 0);
//!
//! assert!(engine.move_in_direction(&mut doc, Direction::RIGHT, 10));
//! use wayfind_document::Document as _;
//! assert_eq!(doc.active_element(), Some(right));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod bridge;
mod config;
mod driver;
mod engine;
mod events;
mod preview;
pub mod scheduler;

pub use config::{Config, FocusGroupsConfig, FrameFocusMethod, IframeSupport, RefocusStrategy};
pub use driver::WATCHED_ATTRIBUTES;
pub use engine::{Engine, LastMove, PositionHint};
pub use events::{DESCRIPTOR_TEXT_MAX, ElementDescriptor, EngineEvent};

// The vocabulary types hosts need alongside the engine.
pub use wayfind_document::{Document, FrameworkHint, MutationKind, MutationRecord};
pub use wayfind_score::{Candidate, DirName, Direction, DistanceFunction, ScoringMode, WRAP_PASS};
