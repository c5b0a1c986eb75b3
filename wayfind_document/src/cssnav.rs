// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reader for the `--spatial-navigation-*` CSS custom properties.
//!
//! Pages can shape navigation without touching script by declaring three
//! custom properties:
//!
//! - `--spatial-navigation-contain: auto | contain`: a `contain` ancestor
//!   confines candidates to its subtree.
//! - `--spatial-navigation-action: auto | focus | scroll`: what a move
//!   should do when it lands (the engine reports this; acting on `scroll`
//!   is host policy).
//! - `--spatial-navigation-function: normal | grid`: opts the element's
//!   moves into grid scoring.
//!
//! Unknown values fall back to the defaults (`auto`, `auto`, `normal`).
//! When the reader is disabled (`use_css_properties: false` in the host
//! configuration) every query returns defaults, so callers never need to
//! special-case the toggle themselves.

use crate::Document;

/// Custom property confining navigation to an ancestor's subtree.
pub const PROP_CONTAIN: &str = "--spatial-navigation-contain";
/// Custom property selecting the post-move action.
pub const PROP_ACTION: &str = "--spatial-navigation-action";
/// Custom property selecting the scoring function.
pub const PROP_FUNCTION: &str = "--spatial-navigation-function";

/// Value of [`PROP_CONTAIN`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum NavContain {
    /// No containment declared.
    #[default]
    Auto,
    /// The element confines navigation within its subtree.
    Contain,
}

/// Value of [`PROP_ACTION`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum NavAction {
    /// Platform-default behavior.
    #[default]
    Auto,
    /// Only move focus; never scroll.
    Focus,
    /// Scroll the landing element into view.
    Scroll,
}

/// Value of [`PROP_FUNCTION`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum NavFunction {
    /// Plain geometric scoring.
    #[default]
    Normal,
    /// Grid scoring: prefer candidates aligned on the cross axis.
    Grid,
}

/// The three navigation properties resolved for one element.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NavProps {
    /// Resolved [`PROP_CONTAIN`].
    pub contain: NavContain,
    /// Resolved [`PROP_ACTION`].
    pub action: NavAction,
    /// Resolved [`PROP_FUNCTION`].
    pub function: NavFunction,
}

/// Resolve the navigation properties declared on `el`.
///
/// With `enabled` false this returns [`NavProps::default`] without touching
/// the document.
pub fn nav_props<D: Document>(doc: &D, el: D::Handle, enabled: bool) -> NavProps {
    if !enabled {
        return NavProps::default();
    }
    NavProps {
        contain: match trimmed(doc, el, PROP_CONTAIN) {
            Some("contain") => NavContain::Contain,
            _ => NavContain::Auto,
        },
        action: match trimmed(doc, el, PROP_ACTION) {
            Some("focus") => NavAction::Focus,
            Some("scroll") => NavAction::Scroll,
            _ => NavAction::Auto,
        },
        function: match trimmed(doc, el, PROP_FUNCTION) {
            Some("grid") => NavFunction::Grid,
            _ => NavFunction::Normal,
        },
    }
}

/// The nearest ancestor of `el` declaring `--spatial-navigation-contain:
/// contain`, or `None`.
///
/// The element itself is not considered: a container confines its subtree,
/// not itself.
pub fn navigation_container<D: Document>(
    doc: &D,
    el: D::Handle,
    enabled: bool,
) -> Option<D::Handle> {
    if !enabled {
        return None;
    }
    let mut cursor = doc.parent(el);
    while let Some(node) = cursor {
        if nav_props(doc, node, true).contain == NavContain::Contain {
            return Some(node);
        }
        cursor = doc.parent(node);
    }
    None
}

/// Whether `node` is inside the subtree rooted at `container` (inclusive).
pub fn within<D: Document>(doc: &D, node: D::Handle, container: D::Handle) -> bool {
    let mut cursor = Some(node);
    while let Some(n) = cursor {
        if n == container {
            return true;
        }
        cursor = doc.parent(n);
    }
    false
}

/// Whether scroll-snap styling on an ancestor scroll container suggests grid
/// scoring for `el`.
///
/// A container that snaps on both axes (`scroll-snap-type: both ...`) lays
/// its content out as a lattice; rows or columns alone are close enough that
/// any non-`none` snap type counts as the hint.
pub fn scroll_snap_grid_hint<D: Document>(doc: &D, el: D::Handle, enabled: bool) -> bool {
    if !enabled {
        return false;
    }
    let mut cursor = doc.parent(el);
    while let Some(node) = cursor {
        if doc.style(node).is_scrollable() {
            return matches!(
                doc.custom_property(node, "scroll-snap-type")
                    .map(str::trim),
                Some(v) if !v.is_empty() && v != "none"
            );
        }
        cursor = doc.parent(node);
    }
    false
}

fn trimmed<'d, D: Document>(doc: &'d D, el: D::Handle, name: &str) -> Option<&'d str> {
    doc.custom_property(el, name).map(str::trim)
}
