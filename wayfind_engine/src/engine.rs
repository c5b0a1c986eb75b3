// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine handle and its focus state machine.

use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::Point;

use wayfind_document::{Document, FocusRequest, cssnav, geometry};
use wayfind_groups::EnterMode;
use wayfind_registry::Registry;
use wayfind_score::{
    Candidate, DirName, Direction, GroupInfo, NavEntry, NavSpace, ScoringMode, find_directional,
    find_wrap,
};

use crate::config::{Config, RefocusStrategy};
use crate::driver::FlushState;
use crate::events::{ElementDescriptor, EngineEvent};
use crate::scheduler::{Scheduler, TaskKey};

/// Record of the most recent successful move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LastMove {
    /// Origin entry index.
    pub from: usize,
    /// Destination entry index.
    pub to: usize,
    /// The direction that was requested.
    pub direction: DirName,
    /// Scoring pass that accepted the winner ([`crate::WRAP_PASS`] for wrap).
    pub pass: i8,
    /// Host time of the move.
    pub timestamp: u64,
}

/// Short-lived geometric fingerprint of the previously focused element.
///
/// When a virtual-list renderer recycles the focused element out from under
/// the engine, identity-based recovery fails; the hint lets recovery land on
/// whatever now occupies (roughly) the same place. Hints expire after
/// [`Config::position_hint_ttl_ms`] and are cleared by a successful
/// recovery.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionHint {
    /// Center of the element the hint was captured from.
    pub center: Point,
    /// Its top-left corner.
    pub top_left: Point,
    /// Serialized identity, for diagnostics and bridge payloads.
    pub descriptor: ElementDescriptor,
    /// Capture time.
    pub at_ms: u64,
}

/// Precomputed per-direction targets for one origin.
#[derive(Clone, Debug)]
pub(crate) struct PrecomputedTargets {
    pub(crate) origin: usize,
    pub(crate) at_ms: u64,
    pub(crate) targets: [Option<Candidate>; 4],
}

/// The spatial-navigation engine.
///
/// One engine instance corresponds to the process-scope navigation state of
/// one page; hosts keep it alive across SPA route changes and thread it
/// (together with their [`Document`] adapter) through every call. All state
/// lives here; creating a second engine creates a fully independent
/// navigation world.
#[derive(Debug)]
pub struct Engine<H> {
    pub(crate) config: Config,
    pub(crate) registry: Registry<H>,
    pub(crate) scheduler: Scheduler,
    pub(crate) events: Vec<EngineEvent<H>>,
    pub(crate) enabled: bool,

    pub(crate) current_index: Option<usize>,
    pub(crate) last_focused: Option<H>,
    pub(crate) last_overlay: Option<ElementDescriptor>,
    pub(crate) position_hint: Option<PositionHint>,
    pub(crate) last_move: Option<LastMove>,
    pub(crate) last_boundary: Option<DirName>,
    pub(crate) dirty: bool,
    pub(crate) precomputed: Option<PrecomputedTargets>,
    pub(crate) overlay_suppressed: bool,
    pub(crate) resize_watch: Option<H>,

    pub(crate) flush: FlushState<H>,
    pub(crate) scroll_accum: f64,
}

impl<H: Copy + Eq + Hash + Debug> Engine<H> {
    /// Create an engine with the given configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let defaults = config.focus_groups.default_rules;
        Self {
            config,
            registry: Registry::new(defaults),
            scheduler: Scheduler::new(),
            events: Vec::new(),
            enabled: true,
            current_index: None,
            last_focused: None,
            last_overlay: None,
            position_hint: None,
            last_move: None,
            last_boundary: None,
            dirty: false,
            precomputed: None,
            overlay_suppressed: false,
            resize_watch: None,
            flush: FlushState::new(),
            scroll_accum: 0.0,
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The focusable registry.
    #[must_use]
    pub fn registry(&self) -> &Registry<H> {
        &self.registry
    }

    /// The focused entry's index, if a valid focus is known.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// The focused element, if a valid focus is known.
    #[must_use]
    pub fn current_handle(&self) -> Option<H> {
        self.current_index
            .and_then(|i| self.registry.get(i))
            .map(|e| e.handle)
    }

    /// The most recent successful move.
    #[must_use]
    pub fn last_move(&self) -> Option<&LastMove> {
        self.last_move.as_ref()
    }

    /// The direction of the most recent boundary, if the last decision was
    /// one.
    #[must_use]
    pub fn last_boundary(&self) -> Option<DirName> {
        self.last_boundary
    }

    /// Whether overlay publication is currently suppressed.
    #[must_use]
    pub fn overlay_suppressed(&self) -> bool {
        self.overlay_suppressed
    }

    /// The element the host should observe for resize, if any.
    #[must_use]
    pub fn resize_watch(&self) -> Option<H> {
        self.resize_watch
    }

    /// Whether the engine processes moves.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Turn move processing on or off. A disabled engine still buffers
    /// observations so the registry is warm when it is re-enabled.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Drain the event outbox.
    #[must_use]
    pub fn take_events(&mut self) -> Vec<EngineEvent<H>> {
        core::mem::take(&mut self.events)
    }

    /// Precomputed next targets for the current focus, indexed by
    /// [`DirName::index`]. `None` until a move has populated them.
    #[must_use]
    pub fn next_targets(&self) -> Option<&[Option<Candidate>; 4]> {
        match (&self.precomputed, self.current_index) {
            (Some(pre), Some(current)) if pre.origin == current => Some(&pre.targets),
            _ => None,
        }
    }

    /// Disconnect everything and forget all navigation state.
    ///
    /// The configuration and enablement survive; the registry, group memory,
    /// pending tasks, watch sets, and outbox do not.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.scheduler.clear();
        self.events.clear();
        self.current_index = None;
        self.last_focused = None;
        self.last_overlay = None;
        self.position_hint = None;
        self.last_move = None;
        self.last_boundary = None;
        self.dirty = false;
        self.precomputed = None;
        self.overlay_suppressed = false;
        self.resize_watch = None;
        self.flush = FlushState::new();
        self.scroll_accum = 0.0;
    }

    /// Rescan the document immediately. Returns the focusable count.
    pub fn refresh_now<D>(&mut self, doc: &D, _now_ms: u64) -> usize
    where
        D: Document<Handle = H>,
    {
        let report = self.registry.full_refresh(doc, &self.config.scan_options());
        self.dirty = false;
        self.precomputed = None;
        self.current_index = report.active_index;
        if let Some(index) = report.active_index {
            self.last_focused = self.registry.get(index).map(|e| e.handle);
        }
        log::debug!(
            "full refresh: {} focusables ({} elements scanned)",
            self.registry.len(),
            report.scanned
        );
        self.registry.len()
    }

    /// Make sure some valid entry holds focus, recovering if needed.
    ///
    /// Resolution order: the document's active element, then
    /// `last_focused`, then the last overlay descriptor (when it still
    /// resolves uniquely), then a fresh-enough position hint, then the
    /// configured auto-refocus strategy. Returns the focused entry's index,
    /// or `None` when nothing could be focused.
    pub fn ensure_valid_focus<D>(&mut self, doc: &mut D, now_ms: u64) -> Option<usize>
    where
        D: Document<Handle = H>,
    {
        // 1. Platform focus already points at one of ours.
        if let Some(active) = doc.active_element()
            && let Some(index) = self.registry.index_of(active)
        {
            self.current_index = Some(index);
            self.last_focused = Some(active);
            return Some(index);
        }

        // 2. The element we last focused is still around.
        if let Some(last) = self.last_focused
            && doc.is_connected(last)
            && let Some(index) = self.registry.index_of(last)
            && self.apply_focus(doc, last)
        {
            self.current_index = Some(index);
            return Some(index);
        }

        // 3. The last overlay target still resolves uniquely.
        if let Some(descriptor) = self.last_overlay.clone() {
            let mut matches = self
                .registry
                .entries()
                .iter()
                .filter(|e| descriptor.matches(doc, e.handle));
            if let (Some(only), None) = (matches.next(), matches.next()) {
                let (index, handle) = (only.index, only.handle);
                if self.apply_focus(doc, handle) {
                    self.commit_focus(doc, index);
                    return Some(index);
                }
            }
        }

        // 4. Geometric recovery from a fresh position hint. Consulting the
        // hint consumes it either way: stale hints are useless and a
        // successful recovery must clear it.
        if let Some(hint) = self.position_hint.take()
            && now_ms.saturating_sub(hint.at_ms) <= self.config.position_hint_ttl_ms
            && let Some((index, handle)) = self.nearest_entry(doc, hint.center)
            && self.apply_focus(doc, handle)
        {
            self.commit_focus(doc, index);
            return Some(index);
        }

        // 5. Auto refocus.
        if self.config.auto_refocus
            && let Some((index, handle)) = self.refocus_pick(doc)
            && self.apply_focus(doc, handle)
        {
            self.commit_focus(doc, index);
            return Some(index);
        }

        None
    }

    /// Move focus in `direction`. Returns whether focus moved.
    ///
    /// A `false` return means the engine was disabled, no valid focus
    /// exists, focus application failed, or the move hit a boundary (in
    /// which case a [`EngineEvent::Boundary`] was emitted and the overlay
    /// suppressed).
    pub fn move_in_direction<D>(&mut self, doc: &mut D, direction: Direction, now_ms: u64) -> bool
    where
        D: Document<Handle = H>,
    {
        if !self.enabled {
            return false;
        }
        let Some(origin) = self.ensure_valid_focus(doc, now_ms) else {
            return false;
        };
        self.store_position_hint(doc, now_ms);

        let Some(candidate) = self.select(doc, origin, direction) else {
            return self.report_boundary(origin, direction, now_ms);
        };
        let Some(target) = self.registry.get(candidate.index).map(|e| e.handle) else {
            return false;
        };
        let from = self
            .registry
            .get(origin)
            .map(|e| ElementDescriptor::capture(doc, e.handle));
        if !self.apply_focus(doc, target) {
            return false;
        }

        self.commit_focus(doc, candidate.index);
        self.last_move = Some(LastMove {
            from: origin,
            to: candidate.index,
            direction: direction.name,
            pass: candidate.pass,
            timestamp: now_ms,
        });
        self.last_boundary = None;
        self.overlay_suppressed = false;
        let to = ElementDescriptor::capture(doc, target);
        self.events.push(EngineEvent::FocusChanged {
            target,
            from,
            to,
            direction: Some(direction.name),
            pass: candidate.pass,
            timestamp: now_ms,
        });
        self.request_preview(doc, now_ms);
        true
    }

    /// [`Engine::move_in_direction`] for hosts holding a raw direction
    /// name. Unknown names are a no-op returning `false`.
    pub fn move_named<D>(&mut self, doc: &mut D, name: &str, now_ms: u64) -> bool
    where
        D: Document<Handle = H>,
    {
        match Direction::from_name(name) {
            Some(direction) => self.move_in_direction(doc, direction, now_ms),
            None => {
                log::debug!("ignoring unknown direction {name:?}");
                false
            }
        }
    }

    /// Programmatically focus a registered element.
    pub fn focus_element<D>(&mut self, doc: &mut D, el: H, now_ms: u64) -> bool
    where
        D: Document<Handle = H>,
    {
        if !self.enabled {
            return false;
        }
        let Some(index) = self.registry.index_of(el) else {
            return false;
        };
        let from = self
            .current_index
            .and_then(|i| self.registry.get(i))
            .map(|e| ElementDescriptor::capture(doc, e.handle));
        if !self.apply_focus(doc, el) {
            return false;
        }
        self.commit_focus(doc, index);
        self.overlay_suppressed = false;
        let to = ElementDescriptor::capture(doc, el);
        self.events.push(EngineEvent::FocusChanged {
            target: el,
            from,
            to,
            direction: None,
            pass: 0,
            timestamp: now_ms,
        });
        self.request_preview(doc, now_ms);
        true
    }

    /// Run pending microtasks (call when the host's current task unwinds).
    pub fn run_microtasks<D>(&mut self, doc: &mut D, now_ms: u64)
    where
        D: Document<Handle = H>,
    {
        for key in self.scheduler.take_microtasks() {
            self.run_task(doc, key, now_ms);
        }
    }

    /// Run pending animation-frame tasks.
    pub fn run_frame<D>(&mut self, doc: &mut D, now_ms: u64)
    where
        D: Document<Handle = H>,
    {
        for key in self.scheduler.take_frame_tasks() {
            self.run_task(doc, key, now_ms);
        }
    }

    /// Run timers due at `now_ms`.
    pub fn run_timers<D>(&mut self, doc: &mut D, now_ms: u64)
    where
        D: Document<Handle = H>,
    {
        for key in self.scheduler.take_due_timers(now_ms) {
            self.run_task(doc, key, now_ms);
        }
    }

    /// The earliest pending timer deadline, for hosts that arm real timers.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_deadline()
    }

    fn run_task<D>(&mut self, doc: &mut D, key: TaskKey, now_ms: u64)
    where
        D: Document<Handle = H>,
    {
        match key {
            TaskKey::MutationFlush => self.mutation_flush_step(doc, now_ms),
            TaskKey::VirtualScroll => self.virtual_refresh_fire(doc, now_ms),
            TaskKey::Overlay => self.publish_overlay(doc),
            TaskKey::HintDecay(direction) => {
                self.events.push(EngineEvent::DirectionReset { direction });
            }
        }
    }

    /// Capture the current entry's geometry for later recovery.
    pub(crate) fn store_position_hint<D>(&mut self, doc: &D, now_ms: u64)
    where
        D: Document<Handle = H>,
    {
        let Some(entry) = self.current_index.and_then(|i| self.registry.get(i)) else {
            return;
        };
        // An already-recycled element reads back a trivial rect; fall back
        // to the geometry the registry last saw for it.
        let fresh = doc.rect(entry.handle);
        let rect = if doc.is_connected(entry.handle) && fresh.width() > 0.0 && fresh.height() > 0.0
        {
            fresh
        } else {
            entry.rect
        };
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }
        self.position_hint = Some(PositionHint {
            center: rect.center(),
            top_left: Point::new(rect.x0, rect.y0),
            descriptor: ElementDescriptor::capture(doc, entry.handle),
            at_ms: now_ms,
        });
    }

    /// Apply focus with `prevent_scroll`, retrying once without options.
    pub(crate) fn apply_focus<D>(&mut self, doc: &mut D, el: H) -> bool
    where
        D: Document<Handle = H>,
    {
        match doc.focus(el, FocusRequest::prevent_scroll()) {
            Ok(()) => true,
            Err(first) => match doc.focus(el, FocusRequest::default()) {
                Ok(()) => true,
                Err(second) => {
                    log::warn!("focus application failed: {first}, retry failed: {second}");
                    false
                }
            },
        }
    }

    /// Book-keep a newly focused entry: current index, last-focused element,
    /// and the owning group's memory.
    pub(crate) fn commit_focus<D>(&mut self, doc: &D, index: usize)
    where
        D: Document<Handle = H>,
    {
        self.current_index = Some(index);
        let Some(entry) = self.registry.get(index) else {
            return;
        };
        let handle = entry.handle;
        self.last_focused = Some(handle);
        if let Some(id) = entry.group.clone() {
            self.registry
                .groups_mut()
                .update_last_focused(&id, handle, |h| doc.is_connected(h));
        }
    }

    /// The boundary path: suppress the overlay, reset the hints, and report.
    fn report_boundary(&mut self, origin: usize, direction: Direction, now_ms: u64) -> bool {
        self.last_boundary = Some(direction.name);
        self.scheduler.cancel(TaskKey::Overlay);
        self.resize_watch = None;
        self.overlay_suppressed = true;
        self.events.push(EngineEvent::OverlayHidden);
        self.events.push(EngineEvent::DirectionDead {
            direction: direction.name,
        });
        self.scheduler.schedule(
            TaskKey::HintDecay(direction.name),
            crate::scheduler::TaskClass::Timer(now_ms + self.config.no_target_decay_ms),
        );

        let (in_trap, trap_id) = match self.registry.get(origin).and_then(|e| e.group.clone()) {
            Some(id) => {
                let eff = self.registry.groups().effective_options(&id);
                if eff.can_exit() {
                    (false, None)
                } else {
                    (true, Some(id.to_string()))
                }
            }
            None => (false, None),
        };
        self.events.push(EngineEvent::Boundary {
            direction: direction.name,
            in_trap,
            trap_id,
            escape_key: None,
            timestamp: now_ms,
        });
        false
    }

    /// Directional selection with the wrap fallback.
    fn select<D>(&self, doc: &D, origin: usize, direction: Direction) -> Option<Candidate>
    where
        D: Document<Handle = H>,
    {
        let (entries, groups) = self.build_space(doc, origin);
        let space = NavSpace {
            entries: &entries,
            groups: &groups,
            viewport: doc.viewport_size(),
        };
        let mode = self.scoring_mode_for(doc, origin);
        let score_config = self.config.score_config(mode);

        if let Some(candidate) = find_directional(&space, origin, direction, &score_config) {
            return Some(candidate);
        }

        match entries.get(origin).and_then(|e| e.group) {
            Some(group) => {
                let info = groups[group];
                if info.wraps {
                    find_wrap(&space, origin, direction, &score_config, Some(group))
                } else if self.config.wrap_navigation && info.can_exit {
                    find_wrap(&space, origin, direction, &score_config, None)
                } else {
                    None
                }
            }
            None if self.config.wrap_navigation => {
                find_wrap(&space, origin, direction, &score_config, None)
            }
            None => None,
        }
    }

    /// Directional selection only (no wrap); used for previews.
    pub(crate) fn select_directional<D>(
        &self,
        doc: &D,
        origin: usize,
        direction: Direction,
    ) -> Option<Candidate>
    where
        D: Document<Handle = H>,
    {
        let (entries, groups) = self.build_space(doc, origin);
        let space = NavSpace {
            entries: &entries,
            groups: &groups,
            viewport: doc.viewport_size(),
        };
        let score_config = self.config.score_config(self.scoring_mode_for(doc, origin));
        find_directional(&space, origin, direction, &score_config)
    }

    /// Snapshot the registry into scorer inputs, relative to `origin`.
    ///
    /// Rects are re-read from the document here: the scorer must see layout
    /// as of this task, not as of the last refresh.
    fn build_space<D>(&self, doc: &D, origin: usize) -> (Vec<NavEntry<H>>, Vec<GroupInfo>)
    where
        D: Document<Handle = H>,
    {
        let groups = self.registry.groups();
        let mut table: Vec<GroupInfo> = Vec::with_capacity(groups.len());
        let mut table_index = HashMap::with_capacity(groups.len());
        for group in groups.iter() {
            let eff = groups.effective_options(&group.id);
            table_index.insert(group.id.clone(), table.len());
            table.push(GroupInfo {
                can_exit: eff.can_exit(),
                wraps: eff.should_wrap(),
                enter_last: eff.enter == EnterMode::Last,
                last_focused: group.last_focused.and_then(|h| self.registry.index_of(h)),
            });
        }

        let container = self.registry.get(origin).and_then(|e| {
            cssnav::navigation_container(doc, e.handle, self.config.use_css_properties)
        });

        let entries = self
            .registry
            .entries()
            .iter()
            .map(|e| NavEntry {
                id: e.handle,
                index: e.index,
                rect: doc.rect(e.handle),
                group: e.group.as_ref().and_then(|id| table_index.get(id)).copied(),
                scroll_key: e.scroll_key,
                in_container: container.is_none_or(|c| cssnav::within(doc, e.handle, c)),
            })
            .collect();
        (entries, table)
    }

    fn scoring_mode_for<D>(&self, doc: &D, origin: usize) -> ScoringMode
    where
        D: Document<Handle = H>,
    {
        if let Some(mode) = self.config.scoring_mode {
            return mode;
        }
        let Some(entry) = self.registry.get(origin) else {
            return ScoringMode::Geometric;
        };
        let css = self.config.use_css_properties;
        let props = cssnav::nav_props(doc, entry.handle, css);
        if props.function == cssnav::NavFunction::Grid
            || cssnav::scroll_snap_grid_hint(doc, entry.handle, css)
        {
            ScoringMode::Grid
        } else {
            ScoringMode::Geometric
        }
    }

    /// The entry nearest to `point`, by Euclidean center distance.
    fn nearest_entry<D>(&self, doc: &D, point: Point) -> Option<(usize, H)>
    where
        D: Document<Handle = H>,
    {
        self.registry
            .entries()
            .iter()
            .map(|e| {
                let center = doc.rect(e.handle).center();
                (e.index, e.handle, center.distance_squared(point))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(index, handle, _)| (index, handle))
    }

    /// The auto-refocus pick for the configured strategy.
    fn refocus_pick<D>(&self, doc: &D) -> Option<(usize, H)>
    where
        D: Document<Handle = H>,
    {
        let viewport = doc.viewport_size();
        match self.config.refocus_strategy {
            RefocusStrategy::First => self
                .registry
                .entries()
                .iter()
                .find(|e| geometry::in_viewport(doc.rect(e.handle), viewport, 0.0))
                .map(|e| (e.index, e.handle)),
            RefocusStrategy::Closest => {
                self.nearest_entry(doc, geometry::viewport_center(viewport))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use kurbo::{Point, Rect, Size};

    use wayfind_document::mem::{MemDocument, NodeId};
    use wayfind_document::{Document, cssnav};
    use wayfind_score::{DirName, Direction, WRAP_PASS};

    use super::*;
    use crate::config::Config;
    use crate::events::EngineEvent;

    #[allow(clippy::cast_precision_loss, reason = "test grids are tiny")]
    fn grid_rect(i: usize) -> Rect {
        let col = i % 10;
        let row = i / 10;
        Rect::new(
            col as f64 * 100.0,
            row as f64 * 50.0,
            col as f64 * 100.0 + 40.0,
            row as f64 * 50.0 + 20.0,
        )
    }

    fn grid(count: usize, viewport: Size) -> (MemDocument, Engine<NodeId>, Vec<NodeId>) {
        let mut doc = MemDocument::new(viewport);
        let mut buttons = Vec::new();
        for i in 0..count {
            let b = doc.create_element("button");
            doc.append_child(doc.root(), b);
            doc.set_rect(b, grid_rect(i));
            buttons.push(b);
        }
        let mut engine = Engine::new(Config::default());
        engine.refresh_now(&doc, 0);
        (doc, engine, buttons)
    }

    fn boundary_events(events: &[EngineEvent<NodeId>]) -> Vec<&EngineEvent<NodeId>> {
        events
            .iter()
            .filter(|e| matches!(e, EngineEvent::Boundary { .. }))
            .collect()
    }

    #[test]
    fn grid_moves_match_the_reference_layout() {
        let (mut doc, mut engine, buttons) = grid(520, Size::new(10_000.0, 10_000.0));

        for (direction, expected) in [
            (Direction::DOWN, 515_usize),
            (Direction::RIGHT, 506),
            (Direction::UP, 495),
        ] {
            assert!(engine.focus_element(&mut doc, buttons[505], 0));
            let _ = engine.take_events();

            assert!(engine.move_in_direction(&mut doc, direction, 10));
            assert_eq!(engine.current_index(), Some(expected));
            let last = engine.last_move().unwrap();
            assert_eq!(last.from, 505);
            assert_eq!(last.to, expected);
            assert_eq!(last.pass, 0);
            assert_eq!(doc.active_element(), Some(buttons[expected]));
        }
    }

    #[test]
    fn opposite_move_returns_to_the_origin() {
        let (mut doc, mut engine, buttons) = grid(9, Size::new(2_000.0, 2_000.0));
        assert!(engine.focus_element(&mut doc, buttons[4], 0));

        assert!(engine.move_in_direction(&mut doc, Direction::RIGHT, 10));
        assert_eq!(engine.current_index(), Some(5));
        assert!(engine.move_in_direction(&mut doc, Direction::LEFT, 20));
        assert_eq!(engine.current_index(), Some(4));
    }

    #[test]
    fn fresh_position_hint_recovers_the_nearest_entry() {
        let mut doc = MemDocument::new(Size::new(800.0, 600.0));
        let mut buttons = Vec::new();
        for y in [50.0, 200.0, 350.0] {
            let b = doc.create_element("button");
            doc.append_child(doc.root(), b);
            doc.set_rect(b, Rect::new(100.0, y, 210.0, y + 40.0));
            buttons.push(b);
        }
        let mut engine = Engine::new(Config::default());
        engine.refresh_now(&doc, 0);

        // The previously focused element is gone; only its geometry remains.
        engine.position_hint = Some(PositionHint {
            center: Point::new(155.0, 220.0),
            top_left: Point::new(100.0, 200.0),
            descriptor: ElementDescriptor::capture(&doc, buttons[1]),
            at_ms: 0,
        });
        doc.blur();

        assert_eq!(engine.ensure_valid_focus(&mut doc, 0), Some(1));
        assert_eq!(engine.current_index(), Some(1));
        assert_eq!(doc.active_element(), Some(buttons[1]));
        assert!(engine.position_hint.is_none(), "recovery must clear the hint");
    }

    #[test]
    fn stale_position_hints_fall_through_to_the_first_strategy() {
        let mut doc = MemDocument::new(Size::new(800.0, 600.0));
        let mut buttons = Vec::new();
        for y in [50.0, 200.0] {
            let b = doc.create_element("button");
            doc.append_child(doc.root(), b);
            doc.set_rect(b, Rect::new(0.0, y, 100.0, y + 40.0));
            buttons.push(b);
        }
        let mut engine = Engine::new(Config::default());
        engine.refresh_now(&doc, 0);

        engine.position_hint = Some(PositionHint {
            center: Point::new(150.0, 225.0),
            top_left: Point::new(100.0, 200.0),
            descriptor: ElementDescriptor::capture(&doc, buttons[1]),
            at_ms: 0,
        });
        doc.blur();

        // 3 seconds later the hint is dead; strategy `first` picks index 0.
        assert_eq!(engine.ensure_valid_focus(&mut doc, 3_000), Some(0));
        assert_eq!(doc.active_element(), Some(buttons[0]));
        assert!(engine.position_hint.is_none());
    }

    #[test]
    fn ensure_valid_focus_is_idempotent_on_a_stable_document() {
        let (mut doc, mut engine, _buttons) = grid(6, Size::new(2_000.0, 2_000.0));
        let first = engine.ensure_valid_focus(&mut doc, 0);
        let second = engine.ensure_valid_focus(&mut doc, 1);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn wrap_navigation_returns_to_the_opposite_edge() {
        let mut doc = MemDocument::new(Size::new(800.0, 600.0));
        let mut buttons = Vec::new();
        for i in 0..4 {
            let b = doc.create_element("button");
            doc.append_child(doc.root(), b);
            let x = f64::from(i) * 100.0;
            doc.set_rect(b, Rect::new(x, 0.0, x + 40.0, 20.0));
            buttons.push(b);
        }
        let mut engine = Engine::new(Config {
            wrap_navigation: true,
            ..Config::default()
        });
        engine.refresh_now(&doc, 0);
        assert!(engine.focus_element(&mut doc, buttons[3], 0));

        assert!(engine.move_in_direction(&mut doc, Direction::RIGHT, 10));
        assert_eq!(doc.active_element(), Some(buttons[0]));
        assert_eq!(engine.last_move().unwrap().pass, WRAP_PASS);
    }

    #[test]
    fn css_containment_turns_the_exit_into_a_boundary() {
        let mut doc = MemDocument::new(Size::new(800.0, 600.0));
        let pane = doc.create_element("div");
        doc.append_child(doc.root(), pane);
        doc.set_custom_property(pane, cssnav::PROP_CONTAIN, "contain");
        let inside = doc.create_element("button");
        doc.append_child(pane, inside);
        doc.set_rect(inside, Rect::new(0.0, 0.0, 40.0, 20.0));
        let outside = doc.create_element("button");
        doc.append_child(doc.root(), outside);
        doc.set_rect(outside, Rect::new(100.0, 0.0, 140.0, 20.0));

        let mut engine = Engine::new(Config::default());
        engine.refresh_now(&doc, 0);
        assert!(engine.focus_element(&mut doc, inside, 0));
        let _ = engine.take_events();

        assert!(!engine.move_in_direction(&mut doc, Direction::RIGHT, 10));
        assert_eq!(doc.active_element(), Some(inside));
        assert!(engine.overlay_suppressed());

        let events = engine.take_events();
        let boundaries = boundary_events(&events);
        assert_eq!(boundaries.len(), 1);
        let EngineEvent::Boundary { direction, .. } = boundaries[0] else {
            unreachable!("filtered to boundaries above");
        };
        assert_eq!(*direction, DirName::Right);
    }

    #[test]
    fn a_lone_focusable_bounces_every_direction() {
        let (mut doc, mut engine, buttons) = grid(1, Size::new(800.0, 600.0));
        assert!(engine.focus_element(&mut doc, buttons[0], 0));
        let _ = engine.take_events();

        for direction in Direction::ALL {
            assert!(!engine.move_in_direction(&mut doc, direction, 10));
            assert!(engine.overlay_suppressed());
            assert_eq!(engine.last_boundary(), Some(direction.name));

            let events = engine.take_events();
            let boundaries = boundary_events(&events);
            assert_eq!(boundaries.len(), 1);
            let EngineEvent::Boundary {
                direction: reported,
                in_trap,
                ..
            } = boundaries[0]
            else {
                unreachable!("filtered to boundaries above");
            };
            assert_eq!(*reported, direction.name);
            assert!(!in_trap);
        }
    }

    #[test]
    fn dead_direction_marks_decay_after_the_timeout() {
        let (mut doc, mut engine, buttons) = grid(1, Size::new(800.0, 600.0));
        assert!(engine.focus_element(&mut doc, buttons[0], 0));
        let _ = engine.take_events();

        assert!(!engine.move_in_direction(&mut doc, Direction::LEFT, 100));
        let events = engine.take_events();
        assert!(events.iter().any(|e| matches!(
            e,
            EngineEvent::DirectionDead { direction: DirName::Left }
        )));

        engine.run_timers(&mut doc, 419);
        assert!(engine.take_events().is_empty());

        engine.run_timers(&mut doc, 420);
        let events = engine.take_events();
        assert!(events.iter().any(|e| matches!(
            e,
            EngineEvent::DirectionReset { direction: DirName::Left }
        )));
    }

    #[test]
    fn contained_groups_report_traps() {
        let mut doc = MemDocument::new(Size::new(800.0, 600.0));
        let pane = doc.create_element("div");
        doc.append_child(doc.root(), pane);
        let _ = doc.set_attribute(pane, "data-focus-group", "jail;boundary=contain");
        let inside = doc.create_element("button");
        doc.append_child(pane, inside);
        doc.set_rect(inside, Rect::new(0.0, 0.0, 40.0, 20.0));
        let outside = doc.create_element("button");
        doc.append_child(doc.root(), outside);
        doc.set_rect(outside, Rect::new(100.0, 0.0, 140.0, 20.0));

        let mut engine = Engine::new(Config::default());
        engine.refresh_now(&doc, 0);
        assert!(engine.focus_element(&mut doc, inside, 0));
        let _ = engine.take_events();

        assert!(!engine.move_in_direction(&mut doc, Direction::RIGHT, 10));
        let events = engine.take_events();
        let boundaries = boundary_events(&events);
        let EngineEvent::Boundary { in_trap, trap_id, .. } = boundaries[0] else {
            unreachable!("filtered to boundaries above");
        };
        assert!(*in_trap);
        assert_eq!(trap_id.as_deref(), Some("jail"));
    }

    #[test]
    fn wrapping_groups_wrap_without_global_wrap() {
        let mut doc = MemDocument::new(Size::new(800.0, 600.0));
        let pane = doc.create_element("div");
        doc.append_child(doc.root(), pane);
        let _ = doc.set_attribute(pane, "data-focus-group", "row;boundary=wrap");
        let mut buttons = Vec::new();
        for i in 0..3 {
            let b = doc.create_element("button");
            doc.append_child(pane, b);
            let x = f64::from(i) * 100.0;
            doc.set_rect(b, Rect::new(x, 0.0, x + 40.0, 20.0));
            buttons.push(b);
        }

        let mut engine = Engine::new(Config::default());
        engine.refresh_now(&doc, 0);
        assert!(engine.focus_element(&mut doc, buttons[2], 0));

        assert!(engine.move_in_direction(&mut doc, Direction::RIGHT, 10));
        assert_eq!(doc.active_element(), Some(buttons[0]));
        assert_eq!(engine.last_move().unwrap().pass, WRAP_PASS);
    }

    #[test]
    fn focus_application_retries_without_options() {
        let (mut doc, mut engine, buttons) = grid(2, Size::new(2_000.0, 2_000.0));
        assert!(engine.focus_element(&mut doc, buttons[0], 0));

        doc.reject_prevent_scroll(true);
        assert!(engine.move_in_direction(&mut doc, Direction::RIGHT, 10));
        assert_eq!(doc.active_element(), Some(buttons[1]));
    }

    #[test]
    fn persistent_focus_failure_leaves_state_unchanged() {
        let (mut doc, mut engine, buttons) = grid(2, Size::new(2_000.0, 2_000.0));
        assert!(engine.focus_element(&mut doc, buttons[0], 0));
        let _ = engine.take_events();

        doc.fail_next_focus(2);
        assert!(!engine.move_in_direction(&mut doc, Direction::RIGHT, 10));
        assert_eq!(engine.current_index(), Some(0));
        assert_eq!(doc.active_element(), Some(buttons[0]));
        assert!(
            !engine
                .take_events()
                .iter()
                .any(|e| matches!(e, EngineEvent::FocusChanged { .. }))
        );
    }

    #[test]
    fn unknown_direction_names_are_a_no_op() {
        let (mut doc, mut engine, buttons) = grid(2, Size::new(2_000.0, 2_000.0));
        assert!(engine.focus_element(&mut doc, buttons[0], 0));

        assert!(!engine.move_named(&mut doc, "sideways", 10));
        assert_eq!(engine.current_index(), Some(0));
        assert!(engine.move_named(&mut doc, "Right", 20));
        assert_eq!(engine.current_index(), Some(1));
    }

    #[test]
    fn disabled_engines_process_no_moves() {
        let (mut doc, mut engine, buttons) = grid(2, Size::new(2_000.0, 2_000.0));
        assert!(engine.focus_element(&mut doc, buttons[0], 0));

        engine.set_enabled(false);
        assert!(!engine.move_in_direction(&mut doc, Direction::RIGHT, 10));
        assert_eq!(engine.current_index(), Some(0));

        engine.set_enabled(true);
        assert!(engine.move_in_direction(&mut doc, Direction::RIGHT, 20));
    }

    #[test]
    fn reset_forgets_everything_but_the_configuration() {
        let (mut doc, mut engine, buttons) = grid(4, Size::new(2_000.0, 2_000.0));
        assert!(engine.focus_element(&mut doc, buttons[0], 0));
        assert!(engine.move_in_direction(&mut doc, Direction::RIGHT, 10));

        engine.reset();
        assert_eq!(engine.current_index(), None);
        assert!(engine.registry().is_empty());
        assert!(engine.last_move().is_none());
        assert!(engine.next_deadline().is_none());
        assert!(engine.take_events().is_empty());

        // A fresh refresh brings the engine back to life.
        engine.refresh_now(&doc, 20);
        assert_eq!(engine.registry().len(), 4);
    }

    #[test]
    fn enter_last_groups_are_entered_at_the_remembered_member() {
        let mut doc = MemDocument::new(Size::new(2_000.0, 2_000.0));
        let opener = doc.create_element("button");
        doc.append_child(doc.root(), opener);
        doc.set_rect(opener, Rect::new(0.0, 50.0, 40.0, 70.0));

        let pane = doc.create_element("div");
        doc.append_child(doc.root(), pane);
        let _ = doc.set_attribute(pane, "data-focus-group", "menu;enter=last");
        let mut items = Vec::new();
        for i in 0..3 {
            let b = doc.create_element("button");
            doc.append_child(pane, b);
            let y = f64::from(i) * 50.0;
            doc.set_rect(b, Rect::new(200.0, y, 240.0, y + 20.0));
            items.push(b);
        }

        let mut engine = Engine::new(Config::default());
        engine.refresh_now(&doc, 0);

        // Visit the menu's second item, leave, and come back: the group
        // remembers.
        assert!(engine.focus_element(&mut doc, items[1], 0));
        assert!(engine.focus_element(&mut doc, opener, 10));
        let _ = engine.take_events();

        assert!(engine.move_in_direction(&mut doc, Direction::RIGHT, 20));
        assert_eq!(doc.active_element(), Some(items[1]));
    }
}
