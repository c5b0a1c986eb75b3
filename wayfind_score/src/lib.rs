// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wayfind Score: directional candidate selection.
//!
//! Given a snapshot of focusable entries ([`NavSpace`]), an origin, and a
//! [`Direction`], [`find_directional`] returns the best [`Candidate`] to move
//! focus to, or `None` when the direction is a dead end. Scores are costs:
//! lower is better.
//!
//! The search runs up to three progressively relaxed passes ([`PASSES`]):
//! pass 0 demands clean edge separation and on-screen candidates, pass 1
//! tolerates overlap and looks slightly past the viewport, and pass 2 drops
//! the viewport requirement entirely. The first pass that yields any
//! acceptable candidate decides the move, and the winning pass index is
//! recorded on the candidate so hosts can tell a confident pick from a
//! desperate one.
//!
//! When every pass fails, [`find_wrap`] can select the entry on the opposite
//! edge instead (wrap-around navigation); wrap winners carry
//! [`WRAP_PASS`] as their pass index.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Rect, Size};
//! use wayfind_score::{Direction, NavEntry, NavSpace, ScoreConfig, find_directional};
//!
//! let entries = vec![
//!     NavEntry::new(1_u32, 0, Rect::new(0.0, 0.0, 40.0, 20.0)),
//!     NavEntry::new(2_u32, 1, Rect::new(60.0, 0.0, 100.0, 20.0)),
//! ];
//! let space = NavSpace {
//!     entries: &entries,
//!     groups: &[],
//!     viewport: Size::new(800.0, 600.0),
//! };
//!
//! let won = find_directional(&space, 0, Direction::RIGHT, &ScoreConfig::default()).unwrap();
//! assert_eq!(won.index, 1);
//! assert_eq!(won.pass, 0);
//!
//! assert!(find_directional(&space, 0, Direction::LEFT, &ScoreConfig::default()).is_none());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use kurbo::{Rect, Size};

use wayfind_document::ScrollKey;
use wayfind_document::geometry::in_viewport;

mod metrics;
mod wrap;

pub use metrics::{DistanceFunction, Metrics, PassProfile, evaluate};
pub use wrap::find_wrap;

/// Axis of motion.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

/// Name of one of the four arrow directions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DirName {
    /// Toward smaller `y`.
    Up,
    /// Toward larger `y`.
    Down,
    /// Toward smaller `x`.
    Left,
    /// Toward larger `x`.
    Right,
}

impl DirName {
    /// Stable index, usable for per-direction arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Down => 1,
            Self::Left => 2,
            Self::Right => 3,
        }
    }

    /// Lower-case name, matching the arrow-key vocabulary.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl core::fmt::Display for DirName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the four arrow directions, as the scorer consumes it: an axis, a
/// sign along that axis, and the name it came from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Direction {
    /// Axis of motion.
    pub axis: Axis,
    /// `+1.0` toward larger coordinates, `-1.0` toward smaller.
    pub sign: f64,
    /// The arrow name.
    pub name: DirName,
}

impl Direction {
    /// Arrow up.
    pub const UP: Self = Self {
        axis: Axis::Y,
        sign: -1.0,
        name: DirName::Up,
    };
    /// Arrow down.
    pub const DOWN: Self = Self {
        axis: Axis::Y,
        sign: 1.0,
        name: DirName::Down,
    };
    /// Arrow left.
    pub const LEFT: Self = Self {
        axis: Axis::X,
        sign: -1.0,
        name: DirName::Left,
    };
    /// Arrow right.
    pub const RIGHT: Self = Self {
        axis: Axis::X,
        sign: 1.0,
        name: DirName::Right,
    };

    /// All four directions, in [`DirName::index`] order.
    pub const ALL: [Self; 4] = [Self::UP, Self::DOWN, Self::LEFT, Self::RIGHT];

    /// Parse an arrow name (`"up"`, `"down"`, `"left"`, `"right"`),
    /// case-insensitively. Unknown names yield `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("up") {
            Some(Self::UP)
        } else if name.eq_ignore_ascii_case("down") {
            Some(Self::DOWN)
        } else if name.eq_ignore_ascii_case("left") {
            Some(Self::LEFT)
        } else if name.eq_ignore_ascii_case("right") {
            Some(Self::RIGHT)
        } else {
            None
        }
    }

    /// Look up a direction by its [`DirName`].
    #[must_use]
    pub const fn from_dir_name(name: DirName) -> Self {
        Self::ALL[name.index()]
    }

    /// The reverse direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self.name {
            DirName::Up => Self::DOWN,
            DirName::Down => Self::UP,
            DirName::Left => Self::RIGHT,
            DirName::Right => Self::LEFT,
        }
    }
}

/// Scoring variant.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScoringMode {
    /// Pure geometric scoring.
    #[default]
    Geometric,
    /// Grid scoring: cross-axis-aligned candidates always sort first and
    /// earn [`GRID_BONUS`].
    Grid,
}

/// Score discount for grid-aligned candidates in grid mode.
pub const GRID_BONUS: f64 = 500.0;
/// Score discount for candidates sharing the origin's group.
pub const SAME_GROUP_BONUS: f64 = 2000.0;
/// Score discount for the remembered entry of an `enter: last` group.
pub const ENTER_LAST_BONUS: f64 = 1000.0;
/// Score discount for staying in the origin's scroll region.
pub const SAME_SCROLL_BONUS: f64 = 150.0;
/// Score surcharge for leaving the origin's scroll region.
pub const OTHER_SCROLL_PENALTY: f64 = 75.0;
/// Score surcharge for candidates outside the viewport.
pub const OFFSCREEN_PENALTY: f64 = 120.0;

/// Pass index recorded on wrap-around winners.
pub const WRAP_PASS: i8 = -1;

/// One focusable entry as the scorer sees it.
#[derive(Copy, Clone, Debug)]
pub struct NavEntry<K> {
    /// The host's element handle.
    pub id: K,
    /// The entry's registry index.
    pub index: usize,
    /// Viewport-relative layout rect.
    pub rect: Rect,
    /// Index into [`NavSpace::groups`], if the entry belongs to a group.
    pub group: Option<usize>,
    /// Key of the entry's scroll region.
    pub scroll_key: Option<ScrollKey<K>>,
    /// Whether the entry lies inside the origin's navigation container.
    /// Entries outside it are rejected outright. (`true` when the origin has
    /// no container.)
    pub in_container: bool,
}

impl<K> NavEntry<K> {
    /// An entry with no group, no scroll region, and no containment concern.
    #[must_use]
    pub fn new(id: K, index: usize, rect: Rect) -> Self {
        Self {
            id,
            index,
            rect,
            group: None,
            scroll_key: None,
            in_container: true,
        }
    }
}

/// Group facts the scorer needs, indexed by [`NavEntry::group`].
#[derive(Copy, Clone, Debug)]
pub struct GroupInfo {
    /// Whether navigation may leave this group (`boundary` is `exit` or
    /// `wrap`).
    pub can_exit: bool,
    /// Whether navigation at this group's edge wraps (`boundary: wrap`).
    pub wraps: bool,
    /// Whether the group declares `enter: last`.
    pub enter_last: bool,
    /// Registry index of the group's remembered member, if any.
    pub last_focused: Option<usize>,
}

/// A read-only snapshot of scoring inputs for one decision.
#[derive(Copy, Clone, Debug)]
pub struct NavSpace<'a, K> {
    /// All focusable entries of the current registry generation.
    pub entries: &'a [NavEntry<K>],
    /// Group facts referenced by the entries.
    pub groups: &'a [GroupInfo],
    /// Viewport size for on-screen tests.
    pub viewport: Size,
}

/// Host scoring configuration.
#[derive(Copy, Clone, Debug)]
pub struct ScoreConfig {
    /// Scoring variant in effect for this origin.
    pub mode: ScoringMode,
    /// Distance term.
    pub distance: DistanceFunction,
    /// Pixel slack added to the edge and forward gates.
    pub overlap_threshold: f64,
    /// Maximum cross-axis center difference treated as grid-aligned.
    pub grid_tolerance: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            mode: ScoringMode::Geometric,
            distance: DistanceFunction::Euclidean,
            overlap_threshold: 0.0,
            grid_tolerance: 20.0,
        }
    }
}

/// A selected move target.
#[derive(Copy, Clone, Debug)]
pub struct Candidate {
    /// Registry index of the winner.
    pub index: usize,
    /// The winner's rect at decision time.
    pub rect: Rect,
    /// Final assembled score (lower is better). For wrap winners this is the
    /// positional key the wrap ordering used.
    pub score: f64,
    /// The geometric measurements behind the score.
    pub metrics: Metrics,
    /// Which pass accepted the winner (`0..=2`), or [`WRAP_PASS`].
    pub pass: i8,
}

/// The three progressively relaxed search passes.
pub const PASSES: [PassProfile; 3] = [
    PassProfile {
        strict_edges: true,
        allow_overlap: false,
        require_viewport: true,
        viewport_margin: 0.0,
        alignment_weight: 10.0,
        distance_weight: 1.0,
        prefer_scroll_group: true,
    },
    PassProfile {
        strict_edges: false,
        allow_overlap: true,
        require_viewport: true,
        viewport_margin: 160.0,
        alignment_weight: 8.0,
        distance_weight: 0.9,
        prefer_scroll_group: true,
    },
    PassProfile {
        strict_edges: false,
        allow_overlap: true,
        require_viewport: false,
        viewport_margin: 0.0,
        alignment_weight: 6.0,
        distance_weight: 0.7,
        prefer_scroll_group: false,
    },
];

/// Find the best candidate from `origin` in `direction`.
///
/// Runs the passes of [`PASSES`] in order and returns the minimum-score
/// acceptable candidate of the first pass that accepts anything. Ties break
/// toward the smaller [`Metrics::distance`]; in grid mode, grid-aligned
/// candidates sort ahead of unaligned ones regardless of raw score.
///
/// Returns `None` when `origin` is out of bounds or no pass accepts any
/// candidate (a boundary, from the caller's point of view).
#[must_use]
pub fn find_directional<K: Copy + Eq>(
    space: &NavSpace<'_, K>,
    origin: usize,
    direction: Direction,
    config: &ScoreConfig,
) -> Option<Candidate> {
    let current = space.entries.get(origin)?;

    #[allow(
        clippy::cast_possible_truncation,
        reason = "pass count is 3; the index fits i8 by construction"
    )]
    for (pass_index, pass) in PASSES.iter().enumerate() {
        let mut best: Option<Candidate> = None;
        for entry in space.entries {
            if entry.index == origin {
                continue;
            }
            let Some(scored) = score_entry(space, current, entry, direction, config, pass) else {
                continue;
            };
            let candidate = Candidate {
                index: entry.index,
                rect: entry.rect,
                score: scored.0,
                metrics: scored.1,
                pass: pass_index as i8,
            };
            if best
                .as_ref()
                .is_none_or(|b| beats(&candidate, b, config.mode))
            {
                best = Some(candidate);
            }
        }
        if best.is_some() {
            return best;
        }
    }
    None
}

/// Whether `a` should replace `b` as the running winner.
///
/// Strict comparison, so equal candidates keep the earlier (registry-order)
/// winner.
fn beats(a: &Candidate, b: &Candidate, mode: ScoringMode) -> bool {
    if mode == ScoringMode::Grid && a.metrics.grid_aligned != b.metrics.grid_aligned {
        return a.metrics.grid_aligned;
    }
    match a.score.total_cmp(&b.score) {
        core::cmp::Ordering::Less => true,
        core::cmp::Ordering::Greater => false,
        core::cmp::Ordering::Equal => a.metrics.distance < b.metrics.distance,
    }
}

/// Gate and score one entry. `None` means rejected.
fn score_entry<K: Copy + Eq>(
    space: &NavSpace<'_, K>,
    current: &NavEntry<K>,
    entry: &NavEntry<K>,
    direction: Direction,
    config: &ScoreConfig,
    pass: &PassProfile,
) -> Option<(f64, Metrics)> {
    // Containment comes first: a confined origin never sees outsiders.
    if !entry.in_container {
        return None;
    }
    if let Some(group) = current.group
        && !space.groups[group].can_exit
        && entry.group != Some(group)
    {
        return None;
    }
    if pass.require_viewport && !in_viewport(entry.rect, space.viewport, pass.viewport_margin) {
        return None;
    }

    let m = evaluate(current.rect, entry.rect, direction, config, pass)?;

    let mut score = m.primary * 1000.0
        + m.secondary * pass.alignment_weight
        + m.distance * pass.distance_weight;

    if config.mode == ScoringMode::Grid && m.grid_aligned {
        score -= GRID_BONUS;
    }
    if let Some(group) = current.group
        && entry.group == Some(group)
    {
        score -= SAME_GROUP_BONUS;
    }
    if let Some(target_group) = entry.group
        && entry.group != current.group
    {
        let info = &space.groups[target_group];
        if info.enter_last {
            match info.last_focused {
                Some(last) if last == entry.index => score -= ENTER_LAST_BONUS,
                // The group remembers a member and this is not it.
                Some(_) => return None,
                // Nothing remembered yet: the group is freshly built, let
                // plain scoring pick the entry point.
                None => {}
            }
        }
    }
    if pass.prefer_scroll_group {
        if entry.scroll_key == current.scroll_key {
            score -= SAME_SCROLL_BONUS;
        } else {
            score += OTHER_SCROLL_PENALTY;
        }
    }
    if !in_viewport(entry.rect, space.viewport, 0.0) {
        score += OFFSCREEN_PENALTY;
    }

    Some((score, m))
}
