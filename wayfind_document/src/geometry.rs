// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element visibility, viewport tests, and scroll-container keys.
//!
//! These predicates are the geometric gatekeepers of the focusable registry:
//! an element only becomes (and stays) a navigation candidate while
//! [`is_visible`] holds, and the scorer consults [`in_viewport`] both as a
//! per-pass gate and as a score penalty.

use kurbo::{Point, Rect, Size};

use crate::{Document, ScrollKey, StyleFlags};

/// Whether `el` is visible for navigation purposes.
///
/// True iff the element's computed style has neither `display: none` nor
/// `visibility: hidden`, the element is not disabled, no ancestor (including
/// the element itself) carries `aria-hidden="true"`, and the current rect is
/// at least `min_size` in both dimensions.
pub fn is_visible<D: Document>(doc: &D, el: D::Handle, min_size: f64) -> bool {
    let style = doc.style(el);
    if style.intersects(StyleFlags::DISPLAY_NONE | StyleFlags::VISIBILITY_HIDDEN) {
        return false;
    }
    if style.contains(StyleFlags::DISABLED) {
        return false;
    }
    if aria_hidden_in_ancestry(doc, el) {
        return false;
    }
    let rect = doc.rect(el);
    rect.width() >= min_size && rect.height() >= min_size
}

/// Whether `el` or any of its ancestors carries `aria-hidden="true"`.
pub fn aria_hidden_in_ancestry<D: Document>(doc: &D, el: D::Handle) -> bool {
    let mut cursor = Some(el);
    while let Some(node) = cursor {
        if doc.style(node).contains(StyleFlags::ARIA_HIDDEN) {
            return true;
        }
        cursor = doc.parent(node);
    }
    false
}

/// Viewport test with margin `m`: the rect counts as on-screen iff
/// `right > -m && bottom > -m && left < vw + m && top < vh + m`.
#[must_use]
pub fn in_viewport(rect: Rect, viewport: Size, margin: f64) -> bool {
    rect.x1 > -margin
        && rect.y1 > -margin
        && rect.x0 < viewport.width + margin
        && rect.y0 < viewport.height + margin
}

/// Center of the viewport.
#[must_use]
pub fn viewport_center(viewport: Size) -> Point {
    Point::new(viewport.width / 2.0, viewport.height / 2.0)
}

/// The key of the nearest scrollable ancestor of `el`, or `None` when the
/// element scrolls with the document itself.
///
/// An ancestor is scrollable when its computed `overflow-x` or `overflow-y`
/// is `auto` or `scroll` (see [`StyleFlags::is_scrollable`]). The element's
/// own overflow does not contribute.
pub fn scroll_key<D: Document>(doc: &D, el: D::Handle) -> Option<ScrollKey<D::Handle>> {
    let mut cursor = doc.parent(el);
    while let Some(node) = cursor {
        if doc.style(node).is_scrollable() {
            return Some(ScrollKey(node));
        }
        cursor = doc.parent(node);
    }
    None
}

#[cfg(test)]
mod tests {
    use kurbo::{Rect, Size};

    use super::*;
    use crate::mem::MemDocument;

    fn doc_with_button() -> (MemDocument, crate::mem::NodeId) {
        let mut doc = MemDocument::new(Size::new(800.0, 600.0));
        let button = doc.create_element("button");
        doc.append_child(doc.root(), button);
        doc.set_rect(button, Rect::new(10.0, 10.0, 110.0, 40.0));
        (doc, button)
    }

    #[test]
    fn visible_button_passes() {
        let (doc, button) = doc_with_button();
        assert!(is_visible(&doc, button, 4.0));
    }

    #[test]
    fn hidden_styles_fail() {
        let (mut doc, button) = doc_with_button();
        doc.set_style(button, StyleFlags::DISPLAY_NONE);
        assert!(!is_visible(&doc, button, 4.0));

        doc.set_style(button, StyleFlags::VISIBILITY_HIDDEN);
        assert!(!is_visible(&doc, button, 4.0));
    }

    #[test]
    fn ancestor_aria_hidden_fails() {
        let (mut doc, button) = doc_with_button();
        let _ = doc.set_attribute(doc.root(), "aria-hidden", "true");
        assert!(!is_visible(&doc, button, 4.0));
    }

    #[test]
    fn tiny_rect_fails() {
        let (mut doc, button) = doc_with_button();
        doc.set_rect(button, Rect::new(10.0, 10.0, 12.0, 12.0));
        assert!(!is_visible(&doc, button, 4.0));
    }

    #[test]
    fn viewport_margin_extends_the_window() {
        let viewport = Size::new(800.0, 600.0);
        let below = Rect::new(0.0, 700.0, 100.0, 740.0);
        assert!(!in_viewport(below, viewport, 0.0));
        assert!(in_viewport(below, viewport, 160.0));
    }

    #[test]
    fn scroll_key_finds_nearest_scrollable_ancestor() {
        let (mut doc, button) = doc_with_button();
        assert_eq!(scroll_key(&doc, button), None);

        let pane = doc.create_element("div");
        doc.append_child(doc.root(), pane);
        doc.set_style(pane, StyleFlags::SCROLLABLE_Y);
        let inner = doc.create_element("button");
        doc.append_child(pane, inner);

        assert_eq!(scroll_key(&doc, inner), Some(ScrollKey(pane)));
        // The scroll container itself keys to the next scrollable ancestor.
        assert_eq!(scroll_key(&doc, pane), None);
    }
}
