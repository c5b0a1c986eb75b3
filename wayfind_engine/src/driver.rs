// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observation intake: mutations, intersections, scroll.
//!
//! The host owns the platform observers and pushes their records at the
//! engine; the engine owns the policy. Mutation records are filtered to the
//! watched attribute set, buffered, and flushed after the debounce. Any
//! `childList` record in a batch forces the coarse path, a full registry
//! refresh, even when attribute records arrived in the same batch. Before
//! the flush touches the registry it captures a position hint, so focus can
//! be recovered even when the focused element itself was recycled away.
//!
//! The flush can additionally hop across the task queue to land after the
//! page framework's own commit: the hop chain is chosen once, from the
//! document's [`FrameworkHint`], on the first flush.

use core::fmt::Debug;
use core::hash::Hash;

use alloc::vec::Vec;

use hashbrown::HashSet;

use wayfind_document::{Document, FrameworkHint, MutationKind, MutationRecord};
use wayfind_registry::AttributeOutcome;

use crate::engine::Engine;
use crate::events::EngineEvent;
use crate::scheduler::{TaskClass, TaskKey};

/// Attributes whose mutation can change focusability or geometry.
pub const WATCHED_ATTRIBUTES: [&str; 7] = [
    "style",
    "class",
    "disabled",
    "hidden",
    "aria-hidden",
    "tabindex",
    "contenteditable",
];

/// One hop of a framework-aware flush dispatch chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Hop {
    Microtask,
    Frame,
    Timer,
}

/// How a flush is dispatched once its debounce expires.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FlushDispatch {
    /// Run at the debounce deadline.
    Inline,
    /// One microtask hop.
    Microtask,
    /// Microtask, then an animation frame.
    MicrotaskThenFrame,
    /// Microtask, then a macrotask.
    MicrotaskThenTimer,
    /// A stability callback, modeled as a macrotask.
    Stability,
}

impl FlushDispatch {
    fn from_hint(hint: FrameworkHint) -> Self {
        match hint {
            FrameworkHint::Unknown => Self::Inline,
            FrameworkHint::ReactLike => Self::MicrotaskThenFrame,
            FrameworkHint::VueLike => Self::MicrotaskThenTimer,
            FrameworkHint::AngularLike => Self::Stability,
            FrameworkHint::SvelteLike => Self::Microtask,
        }
    }

    fn chain(self) -> &'static [Hop] {
        match self {
            Self::Inline => &[],
            Self::Microtask => &[Hop::Microtask],
            Self::MicrotaskThenFrame => &[Hop::Microtask, Hop::Frame],
            Self::MicrotaskThenTimer => &[Hop::Microtask, Hop::Timer],
            Self::Stability => &[Hop::Timer],
        }
    }
}

/// Buffered mutation work between arrival and flush.
#[derive(Debug)]
pub(crate) struct FlushState<H> {
    buffer: Vec<MutationRecord<H>>,
    dispatch: Option<FlushDispatch>,
    stage: usize,
}

impl<H> FlushState<H> {
    pub(crate) fn new() -> Self {
        Self {
            buffer: Vec::new(),
            dispatch: None,
            stage: 0,
        }
    }
}

impl<H: Copy + Eq + Hash + Debug> Engine<H> {
    /// Ingest mutation records from the host's observer.
    ///
    /// Records for attributes outside [`WATCHED_ATTRIBUTES`] are dropped;
    /// anything kept restarts the flush debounce.
    pub fn record_mutations<I>(&mut self, records: I, now_ms: u64)
    where
        I: IntoIterator<Item = MutationRecord<H>>,
    {
        if !self.config.observe_mutations {
            return;
        }
        let mut kept_any = false;
        for record in records {
            let relevant = match &record.kind {
                MutationKind::ChildList => true,
                MutationKind::Attribute(name) => {
                    WATCHED_ATTRIBUTES.contains(&name.as_str())
                }
            };
            if relevant {
                self.flush.buffer.push(record);
                kept_any = true;
            }
        }
        if kept_any {
            self.flush.stage = 0;
            self.scheduler.schedule(
                TaskKey::MutationFlush,
                TaskClass::Timer(now_ms + self.config.mutation_debounce_ms),
            );
        }
    }

    /// Ingest intersection observations.
    ///
    /// A virtual-list sentinel schedules the debounced full refresh; an
    /// observed entry just has its geometry re-read (lazy-load movement).
    pub fn record_intersection<D>(&mut self, doc: &D, handles: &[H], now_ms: u64)
    where
        D: Document<Handle = H>,
    {
        for &handle in handles {
            if self.registry.sentinels().is_sentinel(handle) {
                self.scheduler.schedule(
                    TaskKey::VirtualScroll,
                    TaskClass::Timer(now_ms + self.config.virtual_scroll_debounce_ms),
                );
            } else if self.config.observe_intersection
                && let Some(index) = self.registry.index_of(handle)
            {
                self.registry.refresh_geometry(doc, index);
            }
        }
    }

    /// Ingest a scroll delta (either axis; magnitude only).
    ///
    /// Once the accumulated distance passes the scroll threshold, all entry
    /// geometry is re-read and the overlay repositions on the next frame.
    pub fn record_scroll<D>(&mut self, doc: &D, delta: f64, now_ms: u64)
    where
        D: Document<Handle = H>,
    {
        if !self.config.observe_scroll {
            return;
        }
        self.scroll_accum += delta.abs();
        if self.scroll_accum < self.config.scroll_threshold {
            return;
        }
        self.scroll_accum = 0.0;
        self.registry.refresh_all_geometry(doc);
        self.precomputed = None;
        if self.current_index.is_some() {
            self.request_preview(doc, now_ms);
        }
    }

    /// One step of the flush pipeline: either hop once more across the task
    /// queue, or actually flush.
    pub(crate) fn mutation_flush_step<D>(&mut self, doc: &mut D, now_ms: u64)
    where
        D: Document<Handle = H>,
    {
        let dispatch = *self
            .flush
            .dispatch
            .get_or_insert_with(|| FlushDispatch::from_hint(doc.framework_hint()));
        let chain = dispatch.chain();
        if self.flush.stage < chain.len() {
            let hop = chain[self.flush.stage];
            self.flush.stage += 1;
            let class = match hop {
                Hop::Microtask => TaskClass::Microtask,
                Hop::Frame => TaskClass::Frame,
                Hop::Timer => TaskClass::Timer(now_ms),
            };
            self.scheduler.schedule(TaskKey::MutationFlush, class);
            return;
        }
        self.flush.stage = 0;
        self.flush_mutations(doc, now_ms);
    }

    /// Apply the buffered records to the registry and re-validate focus.
    fn flush_mutations<D>(&mut self, doc: &mut D, now_ms: u64)
    where
        D: Document<Handle = H>,
    {
        let records = core::mem::take(&mut self.flush.buffer);
        if records.is_empty() {
            return;
        }
        self.store_position_hint(doc, now_ms);
        self.dirty = true;
        self.precomputed = None;

        let structural = records
            .iter()
            .any(|r| matches!(r.kind, MutationKind::ChildList));
        if structural {
            // Any structural change invalidates per-element reasoning;
            // attribute records in the same batch ride along for free.
            self.refresh_now(doc, now_ms);
        } else {
            let opts = self.config.scan_options();
            let mut handled: HashSet<H> = HashSet::new();
            for record in &records {
                if !handled.insert(record.target) {
                    continue;
                }
                match self.registry.apply_attribute_change(doc, record.target, &opts) {
                    AttributeOutcome::Removed { index, handle } => {
                        if self.last_focused == Some(handle) {
                            self.last_focused = None;
                        }
                        if self.resize_watch == Some(handle) {
                            self.resize_watch = None;
                        }
                        match self.current_index {
                            Some(current) if current == index => self.current_index = None,
                            Some(current) if current > index => {
                                self.current_index = Some(current - 1);
                            }
                            _ => {}
                        }
                    }
                    AttributeOutcome::Inserted(_)
                    | AttributeOutcome::Refreshed(_)
                    | AttributeOutcome::Ignored => {}
                }
            }
        }

        let _ = self.ensure_valid_focus(doc, now_ms);
        self.reapply_or_hide_overlay(doc, now_ms);
    }

    /// The debounced sentinel refresh: virtual lists recycled some DOM.
    pub(crate) fn virtual_refresh_fire<D>(&mut self, doc: &mut D, now_ms: u64)
    where
        D: Document<Handle = H>,
    {
        self.store_position_hint(doc, now_ms);
        self.dirty = true;
        self.precomputed = None;
        self.refresh_now(doc, now_ms);
        let _ = self.ensure_valid_focus(doc, now_ms);
        self.reapply_or_hide_overlay(doc, now_ms);
    }

    /// After a refresh: overlay follows the active element, or hides.
    fn reapply_or_hide_overlay<D>(&mut self, doc: &D, now_ms: u64)
    where
        D: Document<Handle = H>,
    {
        match doc.active_element().and_then(|a| self.registry.index_of(a)) {
            Some(_) => self.request_preview(doc, now_ms),
            None => self.events.push(EngineEvent::OverlayHidden),
        }
    }
}
