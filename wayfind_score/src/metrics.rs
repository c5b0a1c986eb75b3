// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-candidate geometric measurement: gates and raw metrics.
//!
//! A candidate must survive three gates before it is scored at all:
//!
//! 1. the **edge gate** (strict passes only): the candidate's near edge must
//!    sit past the origin's far edge, with a few pixels of slack;
//! 2. the **forward gate**: the center-to-center displacement along the
//!    motion axis must point the right way (overlap-tolerant passes accept a
//!    small backward allowance);
//! 3. the **cone gate**: the off-axis displacement may not exceed three times
//!    the on-axis displacement (with a 4px floor), which keeps "right" from
//!    meaning "diagonally across the page".

use kurbo::Rect;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs;

use crate::{Axis, Direction, ScoreConfig};

/// Slack, in pixels, built into the edge gate before `overlap_threshold`.
const EDGE_SLACK: f64 = 4.0;
/// Backward allowance of the forward gate on overlap-tolerant passes.
const OVERLAP_BACKWARD_ALLOWANCE: f64 = 12.0;

/// Distance term used in the score.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DistanceFunction {
    /// `sqrt(dx² + dy²)`.
    #[default]
    Euclidean,
    /// `|dx| + |dy|`.
    Manhattan,
    /// `primary + secondary / 2`.
    Projected,
}

/// Knobs of one search pass. See [`crate::PASSES`] for the standard three.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PassProfile {
    /// Require the candidate's near edge to clear the origin's far edge.
    pub strict_edges: bool,
    /// Accept small backward center displacement (overlapping elements).
    pub allow_overlap: bool,
    /// Reject candidates outside the viewport.
    pub require_viewport: bool,
    /// Margin for the viewport requirement.
    pub viewport_margin: f64,
    /// Weight of the off-axis term.
    pub alignment_weight: f64,
    /// Weight of the distance term.
    pub distance_weight: f64,
    /// Apply the scroll-region bias.
    pub prefer_scroll_group: bool,
}

/// Raw geometric measurements for one surviving candidate.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Metrics {
    /// Absolute center displacement along the motion axis.
    pub primary: f64,
    /// Absolute center displacement across the motion axis.
    pub secondary: f64,
    /// The configured distance term.
    pub distance: f64,
    /// Alignment quality on a 0–10 scale (10 = perfectly aligned).
    pub alignment: f64,
    /// Whether the cross-axis centers match within the grid tolerance.
    pub grid_aligned: bool,
}

/// Run the gates and measure `candidate` against `current`.
///
/// Returns `None` when any gate rejects the candidate.
#[must_use]
pub fn evaluate(
    current: Rect,
    candidate: Rect,
    direction: Direction,
    config: &ScoreConfig,
    pass: &PassProfile,
) -> Option<Metrics> {
    if pass.strict_edges && !edge_gate(current, candidate, direction, config.overlap_threshold) {
        return None;
    }

    let dx = candidate.center().x - current.center().x;
    let dy = candidate.center().y - current.center().y;
    let along = match direction.axis {
        Axis::X => dx,
        Axis::Y => dy,
    };

    let forward_threshold = if pass.allow_overlap {
        -(OVERLAP_BACKWARD_ALLOWANCE + config.overlap_threshold)
    } else {
        1.0
    };
    if direction.sign * along <= forward_threshold {
        return None;
    }

    let (primary, secondary) = match direction.axis {
        Axis::X => (dx.abs(), dy.abs()),
        Axis::Y => (dy.abs(), dx.abs()),
    };

    if secondary > (primary * 3.0).max(EDGE_SLACK) {
        return None;
    }

    let distance = match config.distance {
        DistanceFunction::Euclidean => (dx * dx + dy * dy).sqrt(),
        DistanceFunction::Manhattan => dx.abs() + dy.abs(),
        DistanceFunction::Projected => primary + 0.5 * secondary,
    };

    let alignment = if secondary == 0.0 {
        10.0
    } else {
        (10.0 - secondary / 50.0).max(0.0)
    };

    Some(Metrics {
        primary,
        secondary,
        distance,
        alignment,
        grid_aligned: secondary <= config.grid_tolerance,
    })
}

/// The strict edge separation test.
///
/// Moving right, the candidate's left edge must reach past the origin's
/// right edge minus the slack; the other directions mirror this.
fn edge_gate(current: Rect, candidate: Rect, direction: Direction, overlap: f64) -> bool {
    let slack = EDGE_SLACK + overlap;
    match (direction.axis, direction.sign > 0.0) {
        (Axis::X, true) => candidate.x0 >= current.x1 - slack,
        (Axis::X, false) => candidate.x1 <= current.x0 + slack,
        (Axis::Y, true) => candidate.y0 >= current.y1 - slack,
        (Axis::Y, false) => candidate.y1 <= current.y0 + slack,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;

    fn config() -> ScoreConfig {
        ScoreConfig::default()
    }

    fn strict() -> PassProfile {
        crate::PASSES[0]
    }

    fn relaxed() -> PassProfile {
        crate::PASSES[2]
    }

    #[test]
    fn edge_gate_rejects_overlapping_candidates_on_strict_passes() {
        let current = Rect::new(0.0, 0.0, 100.0, 40.0);
        let overlapping = Rect::new(50.0, 0.0, 150.0, 40.0);

        assert!(evaluate(current, overlapping, Direction::RIGHT, &config(), &strict()).is_none());
        assert!(evaluate(current, overlapping, Direction::RIGHT, &config(), &relaxed()).is_some());
    }

    #[test]
    fn overlap_threshold_relaxes_the_edge_gate() {
        let current = Rect::new(0.0, 0.0, 100.0, 40.0);
        let slightly_overlapping = Rect::new(76.0, 0.0, 176.0, 40.0);

        assert!(
            evaluate(
                current,
                slightly_overlapping,
                Direction::RIGHT,
                &config(),
                &strict()
            )
            .is_none()
        );

        let loose = ScoreConfig {
            overlap_threshold: 20.0,
            ..config()
        };
        assert!(
            evaluate(
                current,
                slightly_overlapping,
                Direction::RIGHT,
                &loose,
                &strict()
            )
            .is_some()
        );
    }

    #[test]
    fn forward_gate_rejects_backward_motion() {
        let current = Rect::new(100.0, 0.0, 140.0, 20.0);
        let behind = Rect::new(0.0, 0.0, 40.0, 20.0);
        assert!(evaluate(current, behind, Direction::RIGHT, &config(), &relaxed()).is_none());
        assert!(evaluate(current, behind, Direction::LEFT, &config(), &relaxed()).is_some());
    }

    #[test]
    fn overlap_passes_accept_small_backward_centers() {
        let current = Rect::new(0.0, 0.0, 100.0, 20.0);
        // Center 5px behind the origin's center.
        let nested = Rect::new(20.0, 30.0, 70.0, 50.0);
        assert!(evaluate(current, nested, Direction::DOWN, &config(), &strict()).is_some());

        let slightly_back = Rect::new(0.0, 14.0, 90.0, 34.0);
        assert!(
            evaluate(current, slightly_back, Direction::RIGHT, &config(), &relaxed()).is_some()
        );
        assert!(
            evaluate(current, slightly_back, Direction::RIGHT, &config(), &strict()).is_none()
        );
    }

    #[test]
    fn distance_functions() {
        let current = Rect::new(0.0, 0.0, 20.0, 20.0);
        let candidate = Rect::new(30.0, 30.0, 50.0, 50.0);

        let euclid = evaluate(current, candidate, Direction::DOWN, &config(), &relaxed()).unwrap();
        assert!((euclid.distance - (30.0_f64 * 30.0 * 2.0).sqrt()).abs() < 1e-9);

        let manhattan = ScoreConfig {
            distance: DistanceFunction::Manhattan,
            ..config()
        };
        let m = evaluate(current, candidate, Direction::DOWN, &manhattan, &relaxed()).unwrap();
        assert_eq!(m.distance, 60.0);

        let projected = ScoreConfig {
            distance: DistanceFunction::Projected,
            ..config()
        };
        let p = evaluate(current, candidate, Direction::DOWN, &projected, &relaxed()).unwrap();
        assert_eq!(p.distance, 45.0);
    }

    #[test]
    fn alignment_scale() {
        let current = Rect::new(0.0, 0.0, 20.0, 20.0);

        let aligned = Rect::new(40.0, 0.0, 60.0, 20.0);
        let m = evaluate(current, aligned, Direction::RIGHT, &config(), &relaxed()).unwrap();
        assert_eq!(m.alignment, 10.0);
        assert!(m.grid_aligned);

        let skewed = Rect::new(400.0, 100.0, 420.0, 120.0);
        let m = evaluate(current, skewed, Direction::RIGHT, &config(), &relaxed()).unwrap();
        assert_eq!(m.alignment, 8.0);
        assert!(!m.grid_aligned);
    }
}
