// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wayfind Document: the host-facing document adapter.
//!
//! The Wayfind engine does not talk to a real DOM. Instead, the embedding host
//! (a web renderer, a test harness, a headless driver) implements the
//! [`Document`] trait, giving the engine a uniform, read-mostly view of the
//! page: element handles, tree structure, attributes, computed-style flags,
//! layout rects, and focus application.
//!
//! This crate also carries the two lowest layers of the engine itself:
//!
//! - [`geometry`]: element visibility, viewport tests with margins, and
//!   scroll-container keys.
//! - [`cssnav`]: the reader for the `--spatial-navigation-*` CSS custom
//!   properties and scroll-snap hints.
//!
//! Finally, [`mem::MemDocument`] is a complete in-memory implementation of
//! [`Document`] used by the workspace's tests, benches, and demos. Hosts can
//! also use it as a reference for the expected adapter semantics.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Rect, Size};
//! use wayfind_document::{Document, mem::MemDocument};
//!
//! let mut doc = MemDocument::new(Size::new(1280.0, 720.0));
//! let button = doc.create_element("button");
//! doc.append_child(doc.root(), button);
//! doc.set_rect(button, Rect::new(10.0, 10.0, 110.0, 50.0));
//!
//! assert_eq!(doc.children(doc.root()), vec![button]);
//! assert!(doc.is_connected(button));
//! ```
//!
//! ## Coordinate space
//!
//! All rects are viewport-relative [`kurbo::Rect`]s in logical pixels, the
//! same convention a platform `getBoundingClientRect` uses. The viewport
//! itself is a [`kurbo::Size`]. Adapters are expected to return current
//! layout geometry on every [`Document::rect`] call; the engine does not
//! assume rects are stable between calls.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use kurbo::{Rect, Size};

pub mod cssnav;
pub mod geometry;
pub mod mem;

/// Broad classification of an element, as far as focusability cares.
///
/// Adapters map platform tag names onto this enum; everything that is not one
/// of the focus-relevant tags is [`ElementKind::Other`] and is judged by its
/// attributes alone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// An `a` element.
    Anchor,
    /// A `button` element.
    Button,
    /// An `input` element.
    Input,
    /// A `select` element.
    Select,
    /// A `textarea` element.
    TextArea,
    /// An `iframe` (or equivalent nested-document) element.
    Frame,
    /// Any other element.
    Other,
}

bitflags::bitflags! {
    /// Computed-style facts the engine consults.
    ///
    /// Adapters fold the handful of style properties the engine cares about
    /// into this set so the engine never parses CSS itself. `DISABLED` and
    /// `ARIA_HIDDEN` mirror the corresponding attributes because they flow
    /// through the same invalidation path as style changes.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct StyleFlags: u8 {
        /// Computed `display: none`.
        const DISPLAY_NONE      = 0b0000_0001;
        /// Computed `visibility: hidden`.
        const VISIBILITY_HIDDEN = 0b0000_0010;
        /// The element is disabled (`disabled` attribute or equivalent).
        const DISABLED          = 0b0000_0100;
        /// The element carries `aria-hidden="true"`.
        const ARIA_HIDDEN       = 0b0000_1000;
        /// Computed `overflow-x` is `auto` or `scroll`.
        const SCROLLABLE_X      = 0b0001_0000;
        /// Computed `overflow-y` is `auto` or `scroll`.
        const SCROLLABLE_Y      = 0b0010_0000;
    }
}

impl StyleFlags {
    /// Whether the element is a scroll container on either axis.
    #[must_use]
    pub fn is_scrollable(self) -> bool {
        self.intersects(Self::SCROLLABLE_X | Self::SCROLLABLE_Y)
    }
}

/// Options for a focus application.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FocusRequest {
    /// Ask the platform not to scroll the element into view while focusing.
    pub prevent_scroll: bool,
}

impl FocusRequest {
    /// A request with `prevent_scroll` set.
    #[must_use]
    pub const fn prevent_scroll() -> Self {
        Self {
            prevent_scroll: true,
        }
    }
}

/// Error from [`Document::focus`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FocusError {
    /// The element is no longer part of the document.
    Detached,
    /// The platform rejected the focus call (host-specific reason).
    Rejected,
    /// The requested [`FocusRequest`] options are not supported.
    UnsupportedOptions,
}

impl core::fmt::Display for FocusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Detached => write!(f, "element is detached from the document"),
            Self::Rejected => write!(f, "platform rejected the focus request"),
            Self::UnsupportedOptions => write!(f, "focus options not supported"),
        }
    }
}

impl core::error::Error for FocusError {}

/// Error from [`Document::matches_selector`].
///
/// Adapters report this for selectors they cannot parse; callers are expected
/// to skip the offending selector and continue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorError {
    /// The selector text that failed to parse.
    pub selector: String,
}

impl core::fmt::Display for SelectorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "invalid selector: {:?}", self.selector)
    }
}

impl core::error::Error for SelectorError {}

/// Scheduling fingerprint of the framework driving the page, if any.
///
/// Hosts detect this however they like (global markers, bundler artifacts);
/// the engine only uses it to choose how a mutation flush hops across the
/// task queue before running.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FrameworkHint {
    /// No framework detected, or detection unavailable.
    #[default]
    Unknown,
    /// Batches state into microtasks, commits on the next frame.
    ReactLike,
    /// Flushes watchers on a tick, then a macrotask.
    VueLike,
    /// Exposes a stability callback after change detection.
    AngularLike,
    /// Flushes synchronously-scheduled microtasks.
    SvelteLike,
}

/// Key identifying the nearest scrollable ancestor of an element.
///
/// Two entries share a `ScrollKey` exactly when they live in the same scroll
/// region; the scorer uses this to bias navigation toward staying within the
/// region the user is already in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScrollKey<H>(pub H);

/// A single observed change to the document.
///
/// Hosts translate platform mutation-observer records into this shape and
/// push them at the engine; the engine buffers, filters, and debounces them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationRecord<H> {
    /// The element the change happened on (for `ChildList`, the parent).
    pub target: H,
    /// What changed.
    pub kind: MutationKind,
}

/// The kind of change a [`MutationRecord`] describes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationKind {
    /// Children were added to or removed from the target.
    ChildList,
    /// The named attribute changed on the target.
    Attribute(String),
}

/// Host-implemented view of the page the engine navigates.
///
/// Handles are small copyable identifiers; a handle stays valid for the
/// lifetime of its element and [`Document::is_connected`] reports whether the
/// element is still part of the tree. Methods taking a disconnected handle
/// must not panic: structural queries return empty results and
/// [`Document::focus`] returns [`FocusError::Detached`].
pub trait Document {
    /// Identifier for one element.
    type Handle: Copy + Eq + Hash + Debug;

    /// The document root (the `body`-equivalent the engine scans from).
    fn root(&self) -> Self::Handle;

    /// The parent of `el`, or `None` at the root (or when detached).
    fn parent(&self, el: Self::Handle) -> Option<Self::Handle>;

    /// The children of `el`, in tree order.
    ///
    /// Where the platform distributes light-DOM children into shadow-DOM
    /// slots, this must return the *flattened* children, so a plain
    /// depth-first walk visits every rendered element once.
    fn children(&self, el: Self::Handle) -> Vec<Self::Handle>;

    /// The shadow root attached to `el`, if any.
    fn shadow_root(&self, el: Self::Handle) -> Option<Self::Handle>;

    /// Whether `el` is still attached to the document tree.
    fn is_connected(&self, el: Self::Handle) -> bool;

    /// The focus-relevant classification of `el`.
    fn kind(&self, el: Self::Handle) -> ElementKind;

    /// The element's tag name, as the platform reports it.
    fn tag_name(&self, el: Self::Handle) -> Option<&str>;

    /// The value of attribute `name` on `el`.
    fn attribute(&self, el: Self::Handle, name: &str) -> Option<&str>;

    /// Whether `el` carries attribute `name`, with any value.
    fn has_attribute(&self, el: Self::Handle, name: &str) -> bool {
        self.attribute(el, name).is_some()
    }

    /// Computed-style facts for `el`.
    fn style(&self, el: Self::Handle) -> StyleFlags;

    /// The value of CSS custom property `name` on `el`, if set.
    fn custom_property(&self, el: Self::Handle, name: &str) -> Option<&str>;

    /// Current viewport-relative bounding rect of `el`.
    ///
    /// Must reflect layout at call time; the engine re-reads rects instead of
    /// caching them across tasks.
    fn rect(&self, el: Self::Handle) -> Rect;

    /// Size of the viewport, in the same logical pixels as [`Document::rect`].
    fn viewport_size(&self) -> Size;

    /// The element that currently holds platform focus, if any.
    fn active_element(&self) -> Option<Self::Handle>;

    /// Apply focus to `el`.
    ///
    /// Adapters that cannot honor [`FocusRequest::prevent_scroll`] should
    /// return [`FocusError::UnsupportedOptions`]; the engine retries once
    /// with default options.
    fn focus(&mut self, el: Self::Handle, request: FocusRequest) -> Result<(), FocusError>;

    /// Whether `el` matches the given selector.
    ///
    /// Only used for host-configured selector lists (virtual-list container
    /// detection). Adapters may support any selector subset they like, as
    /// long as unsupported syntax yields `Err` rather than a wrong answer.
    fn matches_selector(&self, el: Self::Handle, selector: &str)
    -> Result<bool, SelectorError>;

    /// Up to `max_len` characters of `el`'s own text content.
    fn text_excerpt(&self, el: Self::Handle, max_len: usize) -> Option<String>;

    /// Scheduling fingerprint of the framework driving this page.
    fn framework_hint(&self) -> FrameworkHint {
        FrameworkHint::Unknown
    }
}
