// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Preview targets and overlay publication.
//!
//! After every successful move the engine recomputes where each of the four
//! arrows would go next and coalesces one overlay publication onto the next
//! animation frame. The UI layer draws from [`crate::EngineEvent::OverlayUpdate`]:
//! the focused rect plus, per direction, the rect a chevron should point at
//! (`None` leaves that chevron in its base state). A newer request replaces
//! the pending frame task, and a frame that fires while the overlay is
//! suppressed (a boundary happened in between) is skipped silently.
//!
//! Next-target computation is cached per origin for
//! [`crate::Config::precompute_cache_timeout_ms`]; any registry change marks
//! the cache dirty and drops it.

use core::fmt::Debug;
use core::hash::Hash;

use wayfind_document::Document;
use wayfind_score::{Candidate, Direction};

use crate::engine::{Engine, PrecomputedTargets};
use crate::events::{ElementDescriptor, EngineEvent};
use crate::scheduler::{TaskClass, TaskKey};

impl<H: Copy + Eq + Hash + Debug> Engine<H> {
    /// Recompute next targets for the current focus and coalesce an overlay
    /// publication onto the next animation frame.
    pub(crate) fn request_preview<D>(&mut self, doc: &D, now_ms: u64)
    where
        D: Document<Handle = H>,
    {
        let Some(origin) = self.current_index else {
            return;
        };
        self.compute_targets(doc, origin, now_ms);
        self.scheduler.schedule(TaskKey::Overlay, TaskClass::Frame);
    }

    /// Fill (or reuse) the per-direction target cache for `origin`.
    pub(crate) fn compute_targets<D>(&mut self, doc: &D, origin: usize, now_ms: u64)
    where
        D: Document<Handle = H>,
    {
        if self.config.precompute_candidates
            && !self.dirty
            && let Some(pre) = &self.precomputed
            && pre.origin == origin
            && now_ms.saturating_sub(pre.at_ms) <= self.config.precompute_cache_timeout_ms
        {
            return;
        }

        let mut targets: [Option<Candidate>; 4] = [None; 4];
        for direction in Direction::ALL {
            targets[direction.name.index()] = self.select_directional(doc, origin, direction);
        }
        self.precomputed = Some(PrecomputedTargets {
            origin,
            at_ms: now_ms,
            targets,
        });
    }

    /// The coalesced frame callback: publish the overlay, or skip silently
    /// while suppressed.
    pub(crate) fn publish_overlay<D>(&mut self, doc: &D)
    where
        D: Document<Handle = H>,
    {
        if self.overlay_suppressed {
            return;
        }
        let Some(entry) = self.current_index.and_then(|i| self.registry.get(i)) else {
            return;
        };
        let target = entry.handle;
        let rect = doc.rect(target);

        let mut hints = [None; 4];
        if let Some(pre) = &self.precomputed
            && Some(pre.origin) == self.current_index
        {
            for (slot, candidate) in hints.iter_mut().zip(pre.targets.iter()) {
                *slot = candidate.as_ref().map(|c| c.rect);
            }
        }

        self.last_overlay = Some(ElementDescriptor::capture(doc, target));
        self.resize_watch = Some(target);
        self.events.push(EngineEvent::OverlayUpdate {
            target,
            rect,
            hints,
        });
    }
}
