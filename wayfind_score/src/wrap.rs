// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wrap-around selection: jumping to the opposite edge.
//!
//! When every directional pass comes up empty, wrap navigation falls back to
//! the entry at the opposite extreme of the motion axis: pressing down from
//! the bottom row lands on the topmost entry, pressing right from the last
//! column lands on the leftmost, and so on. In grid mode, entries whose
//! cross-axis center matches the origin's (within the grid tolerance) sort
//! ahead of the rest, so wrapping stays in the same row or column when one
//! exists. Entries sharing the positional key keep registry order.

use kurbo::Rect;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs;

use crate::{
    Axis, Candidate, Direction, Metrics, NavEntry, NavSpace, ScoreConfig, ScoringMode, WRAP_PASS,
};

/// Select the wrap-around target from `origin` in `direction`.
///
/// `restrict_group` confines the candidate set to one group (used when the
/// origin's group wraps on itself, or cannot be exited). Containment still
/// applies: entries outside the origin's navigation container never wrap
/// into view.
///
/// The returned candidate carries [`WRAP_PASS`] and, as its score, the
/// positional key the ordering used (negated for the max-seeking
/// directions).
#[must_use]
pub fn find_wrap<K: Copy + Eq>(
    space: &NavSpace<'_, K>,
    origin: usize,
    direction: Direction,
    config: &ScoreConfig,
    restrict_group: Option<usize>,
) -> Option<Candidate> {
    let current = space.entries.get(origin)?;
    let mut best: Option<(bool, f64, &NavEntry<K>)> = None;

    for entry in space.entries {
        if entry.index == origin || !entry.in_container {
            continue;
        }
        if let Some(group) = restrict_group
            && entry.group != Some(group)
        {
            continue;
        }
        let key = positional_key(entry.rect, direction);
        let aligned = config.mode == ScoringMode::Grid
            && cross_axis_gap(current.rect, entry.rect, direction) <= config.grid_tolerance;
        // Strict comparison keeps the earlier entry on exact key ties.
        let replace = match &best {
            None => true,
            Some((best_aligned, best_key, _)) => {
                if aligned != *best_aligned {
                    aligned
                } else {
                    key < *best_key
                }
            }
        };
        if replace {
            best = Some((aligned, key, entry));
        }
    }

    best.map(|(aligned, key, entry)| {
        let dx = entry.rect.center().x - current.rect.center().x;
        let dy = entry.rect.center().y - current.rect.center().y;
        let (primary, secondary) = match direction.axis {
            Axis::X => (dx.abs(), dy.abs()),
            Axis::Y => (dy.abs(), dx.abs()),
        };
        Candidate {
            index: entry.index,
            rect: entry.rect,
            score: key,
            metrics: Metrics {
                primary,
                secondary,
                distance: (dx * dx + dy * dy).sqrt(),
                alignment: if secondary == 0.0 {
                    10.0
                } else {
                    (10.0 - secondary / 50.0).max(0.0)
                },
                grid_aligned: aligned,
            },
            pass: WRAP_PASS,
        }
    })
}

/// The minimized ordering key: the opposite-edge extreme for `direction`.
///
/// Down seeks the minimum top, up the maximum bottom, right the minimum
/// left, left the maximum right; the max-seeking cases are negated so a
/// single minimum scan covers all four.
fn positional_key(rect: Rect, direction: Direction) -> f64 {
    match (direction.axis, direction.sign > 0.0) {
        (Axis::Y, true) => rect.y0,
        (Axis::Y, false) => -rect.y1,
        (Axis::X, true) => rect.x0,
        (Axis::X, false) => -rect.x1,
    }
}

fn cross_axis_gap(current: Rect, candidate: Rect, direction: Direction) -> f64 {
    match direction.axis {
        Axis::X => (candidate.center().y - current.center().y).abs(),
        Axis::Y => (candidate.center().x - current.center().x).abs(),
    }
}
