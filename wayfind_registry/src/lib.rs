// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wayfind Registry: the live index of focusable elements.
//!
//! The registry owns the ordered sequence of [`FocusableEntry`] values the
//! scorer selects from, together with the focus-group set built from the same
//! scan. It is maintained two ways:
//!
//! - [`Registry::full_refresh`] rescans the whole document: it walks the tree
//!   (descending into shadow roots when asked), applies the focusable
//!   predicate and the visibility rules, rebuilds groups (carrying each
//!   group's last-focused member across generations by id), reassigns dense
//!   indices, and diffs the set of elements that should be observed for
//!   intersection.
//! - [`Registry::apply_attribute_change`] handles a single element whose
//!   attributes changed: a newly focusable element is appended, a no longer
//!   focusable one is spliced out (with the tail reindexed), and one that
//!   stayed focusable just has its geometry re-read.
//!
//! Structural (`childList`) changes always go through a full refresh; the
//! per-element path exists only for attribute flips. That split, together
//! with the dense-index invariant after every operation, is what the
//! engine's state machine builds on.
//!
//! The registry also locates virtual-list containers by host-configured
//! selectors and nominates sentinel children (first, middle, last) for
//! intersection observation, which is how DOM-recycling scrollers trigger
//! refreshes before the user can navigate into a stale region.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};
use kurbo::Rect;

use wayfind_document::{Document, ElementKind, ScrollKey, geometry};
use wayfind_groups::{GroupDefaults, GroupId, GroupSet, parse_declaration};

mod sentinel;

pub use sentinel::SentinelSet;

/// Attribute declaring a focus group on a container.
pub const FOCUS_GROUP_ATTR: &str = "data-focus-group";

/// One candidate element, as tracked by the registry.
#[derive(Clone, Debug)]
pub struct FocusableEntry<H> {
    /// Handle of the live element.
    pub handle: H,
    /// Layout rect as of the last geometry read.
    pub rect: Rect,
    /// Key of the nearest scrollable ancestor.
    pub scroll_key: Option<ScrollKey<H>>,
    /// Owning focus group, if any.
    pub group: Option<GroupId>,
    /// Position in the registry's ordered sequence.
    pub index: usize,
}

/// Knobs consulted during scans, distilled from the host configuration.
#[derive(Clone, Debug)]
pub struct ScanOptions {
    /// Minimum rect size (both dimensions) for an element to count.
    pub min_element_size: f64,
    /// Descend into shadow roots.
    pub traverse_shadow_dom: bool,
    /// Treat iframes as focusable.
    pub include_frames: bool,
    /// Honor `data-focus-group` declarations.
    pub groups_enabled: bool,
    /// Locate virtual-list containers and nominate sentinels.
    pub observe_virtual_containers: bool,
    /// Selectors identifying virtual-list containers.
    pub virtual_container_selectors: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            min_element_size: 2.0,
            traverse_shadow_dom: false,
            include_frames: false,
            groups_enabled: true,
            observe_virtual_containers: false,
            virtual_container_selectors: Vec::new(),
        }
    }
}

/// What a full refresh found and changed.
#[derive(Clone, Debug)]
pub struct RefreshReport<H> {
    /// Elements visited by the scan (focusable or not).
    pub scanned: usize,
    /// Index of the document's active element within the new generation.
    pub active_index: Option<usize>,
    /// Elements newly requiring intersection observation.
    pub watch_added: Vec<H>,
    /// Elements whose intersection observation should be dropped.
    pub watch_removed: Vec<H>,
}

impl<H> Default for RefreshReport<H> {
    fn default() -> Self {
        Self {
            scanned: 0,
            active_index: None,
            watch_added: Vec::new(),
            watch_removed: Vec::new(),
        }
    }
}

/// Outcome of [`Registry::apply_attribute_change`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeOutcome<H> {
    /// The element became focusable and was appended at this index.
    Inserted(usize),
    /// The element stopped being focusable and was removed from this index.
    Removed {
        /// Index the entry occupied before removal.
        index: usize,
        /// The removed element.
        handle: H,
    },
    /// The element stayed focusable; its geometry was re-read.
    Refreshed(usize),
    /// The element was not and is not focusable.
    Ignored,
}

/// The ordered focusable index plus its focus-group set.
#[derive(Clone, Debug)]
pub struct Registry<H> {
    entries: Vec<FocusableEntry<H>>,
    by_handle: HashMap<H, usize>,
    groups: GroupSet<H>,
    observed: HashSet<H>,
    sentinels: SentinelSet<H>,
}

impl<H: Copy + Eq + core::hash::Hash + core::fmt::Debug> Registry<H> {
    /// An empty registry.
    #[must_use]
    pub fn new(group_defaults: GroupDefaults) -> Self {
        Self {
            entries: Vec::new(),
            by_handle: HashMap::new(),
            groups: GroupSet::new(group_defaults),
            observed: HashSet::new(),
            sentinels: SentinelSet::new(),
        }
    }

    /// The ordered entry sequence.
    #[must_use]
    pub fn entries(&self) -> &[FocusableEntry<H>] {
        &self.entries
    }

    /// Number of focusable entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no focusables are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FocusableEntry<H>> {
        self.entries.get(index)
    }

    /// The index of `handle`, if registered.
    #[must_use]
    pub fn index_of(&self, handle: H) -> Option<usize> {
        self.by_handle.get(&handle).copied()
    }

    /// The focus-group set of the current generation.
    #[must_use]
    pub fn groups(&self) -> &GroupSet<H> {
        &self.groups
    }

    /// Mutable access to the group set (last-focused updates).
    pub fn groups_mut(&mut self) -> &mut GroupSet<H> {
        &mut self.groups
    }

    /// The current virtual-list sentinel watch set.
    #[must_use]
    pub fn sentinels(&self) -> &SentinelSet<H> {
        &self.sentinels
    }

    /// Elements currently subscribed for intersection observation.
    pub fn observed(&self) -> impl Iterator<Item = H> + '_ {
        self.observed.iter().copied()
    }

    /// Drop everything, including group memory and watch sets.
    pub fn clear(&mut self) {
        let defaults = self.groups.defaults();
        self.entries.clear();
        self.by_handle.clear();
        self.groups = GroupSet::new(defaults);
        self.observed.clear();
        self.sentinels = SentinelSet::new();
    }

    /// Rescan the whole document and rebuild the registry.
    pub fn full_refresh<D>(&mut self, doc: &D, opts: &ScanOptions) -> RefreshReport<H>
    where
        D: Document<Handle = H>,
    {
        let mut report = RefreshReport::default();
        let mut seen: HashSet<H> = HashSet::new();
        let mut visited: Vec<H> = Vec::new();
        let mut candidates: Vec<H> = Vec::new();

        self.groups.start_rebuild();

        // Preorder walk; ancestors are visited before descendants, so group
        // declarations exist by the time members attach to them.
        let mut stack = alloc::vec![doc.root()];
        while let Some(el) = stack.pop() {
            if !seen.insert(el) {
                continue;
            }
            visited.push(el);
            report.scanned += 1;

            if opts.groups_enabled
                && let Some(value) = doc.attribute(el, FOCUS_GROUP_ATTR)
                && let Some(decl) = parse_declaration(value)
            {
                self.groups.declare(decl, el);
            }

            if is_focus_candidate(doc, el, opts.include_frames)
                && geometry::is_visible(doc, el, opts.min_element_size)
            {
                candidates.push(el);
            }

            let children = doc.children(el);
            for child in children.into_iter().rev() {
                stack.push(child);
            }
            if opts.traverse_shadow_dom
                && let Some(shadow) = doc.shadow_root(el)
            {
                stack.push(shadow);
            }
        }

        self.entries.clear();
        self.by_handle.clear();
        for handle in candidates {
            let group = if opts.groups_enabled {
                self.attach_to_group(doc, handle)
            } else {
                None
            };
            let index = self.entries.len();
            self.entries.push(FocusableEntry {
                handle,
                rect: doc.rect(handle),
                scroll_key: geometry::scroll_key(doc, handle),
                group,
                index,
            });
            self.by_handle.insert(handle, index);
        }

        self.groups.finish_rebuild(|h| doc.is_connected(h));

        // The intersection watch set tracks exactly the current entries.
        let next: HashSet<H> = self.entries.iter().map(|e| e.handle).collect();
        report.watch_added = next.difference(&self.observed).copied().collect();
        report.watch_removed = self.observed.difference(&next).copied().collect();
        self.observed = next;

        if opts.observe_virtual_containers {
            self.sentinels =
                sentinel::locate(doc, &visited, &opts.virtual_container_selectors);
        } else {
            self.sentinels = SentinelSet::new();
        }

        report.active_index = doc.active_element().and_then(|a| self.index_of(a));
        if let Some(index) = report.active_index
            && let Some(id) = self.entries[index].group.clone()
        {
            let handle = self.entries[index].handle;
            self.groups
                .update_last_focused(&id, handle, |h| doc.is_connected(h));
        }

        report
    }

    /// Re-evaluate one element after an attribute mutation.
    pub fn apply_attribute_change<D>(
        &mut self,
        doc: &D,
        el: H,
        opts: &ScanOptions,
    ) -> AttributeOutcome<H>
    where
        D: Document<Handle = H>,
    {
        let focusable_now = doc.is_connected(el)
            && is_focus_candidate(doc, el, opts.include_frames)
            && geometry::is_visible(doc, el, opts.min_element_size);

        match (self.index_of(el), focusable_now) {
            (None, true) => {
                let group = if opts.groups_enabled {
                    self.attach_to_group(doc, el)
                } else {
                    None
                };
                let index = self.entries.len();
                self.entries.push(FocusableEntry {
                    handle: el,
                    rect: doc.rect(el),
                    scroll_key: geometry::scroll_key(doc, el),
                    group,
                    index,
                });
                self.by_handle.insert(el, index);
                self.observed.insert(el);
                AttributeOutcome::Inserted(index)
            }
            (Some(index), false) => {
                self.remove_at(index);
                AttributeOutcome::Removed { index, handle: el }
            }
            (Some(index), true) => {
                self.refresh_geometry(doc, index);
                AttributeOutcome::Refreshed(index)
            }
            (None, false) => AttributeOutcome::Ignored,
        }
    }

    /// Splice out the entry at `index`, reindexing the tail.
    pub fn remove_at(&mut self, index: usize) {
        if index >= self.entries.len() {
            return;
        }
        let entry = self.entries.remove(index);
        self.by_handle.remove(&entry.handle);
        self.observed.remove(&entry.handle);
        for later in &mut self.entries[index..] {
            later.index -= 1;
            self.by_handle.insert(later.handle, later.index);
        }
        if let Some(id) = entry.group {
            // Drop the member; remembered last-focused is validated at use.
            let handle = entry.handle;
            self.groups.retain_members(&id, |&h| h != handle);
        }
    }

    /// Re-read the rect and scroll key of the entry at `index`.
    pub fn refresh_geometry<D>(&mut self, doc: &D, index: usize)
    where
        D: Document<Handle = H>,
    {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.rect = doc.rect(entry.handle);
            entry.scroll_key = geometry::scroll_key(doc, entry.handle);
        }
    }

    /// Re-read geometry for every entry (scroll and resize handling).
    pub fn refresh_all_geometry<D>(&mut self, doc: &D)
    where
        D: Document<Handle = H>,
    {
        for entry in &mut self.entries {
            entry.rect = doc.rect(entry.handle);
            entry.scroll_key = geometry::scroll_key(doc, entry.handle);
        }
    }

    /// Whether the registry satisfies its structural invariants: dense
    /// indices, a consistent reverse map, and group memberships that point
    /// at existing groups containing the member.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.index != i || self.by_handle.get(&entry.handle) != Some(&i) {
                return false;
            }
            if let Some(id) = &entry.group {
                match self.groups.get(id) {
                    Some(group) if group.members.contains(&entry.handle) => {}
                    _ => return false,
                }
            }
        }
        self.by_handle.len() == self.entries.len()
    }

    /// Attach `el` to the group of its nearest `data-focus-group` ancestor
    /// (self-inclusive), if that group exists in the current generation.
    fn attach_to_group<D>(&mut self, doc: &D, el: H) -> Option<GroupId>
    where
        D: Document<Handle = H>,
    {
        let mut cursor = Some(el);
        while let Some(node) = cursor {
            if let Some(value) = doc.attribute(node, FOCUS_GROUP_ATTR) {
                let id = parse_declaration(value)?.id;
                return self.groups.add_member(&id, el).then_some(id);
            }
            cursor = doc.parent(node);
        }
        None
    }

}

/// Whether `el` matches the focusable selector union.
///
/// The union is: `a[href]`, `a[aria-haspopup]`, `[role=link]`,
/// `button:not([disabled])`, `[role=button]`, `[aria-haspopup=true]`,
/// `input:not([disabled])`, `select:not([disabled])`,
/// `textarea:not([disabled])`, `[tabindex]:not([tabindex="-1"])`,
/// `[contenteditable=true]`, plus iframes when enabled. Disabled controls
/// are additionally rejected by the visibility rules, so this predicate only
/// answers "is this the kind of thing focus lands on".
pub fn is_focus_candidate<D: Document>(doc: &D, el: D::Handle, include_frames: bool) -> bool {
    let kind = doc.kind(el);
    match kind {
        ElementKind::Anchor => {
            if doc.has_attribute(el, "href") || doc.has_attribute(el, "aria-haspopup") {
                return true;
            }
        }
        ElementKind::Button | ElementKind::Input | ElementKind::Select | ElementKind::TextArea => {
            return !doc.has_attribute(el, "disabled");
        }
        ElementKind::Frame => {
            if include_frames {
                return true;
            }
        }
        ElementKind::Other => {}
    }
    if matches!(doc.attribute(el, "role"), Some("link" | "button")) {
        return true;
    }
    if doc.attribute(el, "aria-haspopup") == Some("true") {
        return true;
    }
    if let Some(tabindex) = doc.attribute(el, "tabindex")
        && tabindex.trim() != "-1"
    {
        return true;
    }
    doc.attribute(el, "contenteditable") == Some("true")
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use kurbo::{Rect, Size};

    use wayfind_document::StyleFlags;
    use wayfind_document::mem::{MemDocument, NodeId};

    use super::*;

    fn registry() -> Registry<NodeId> {
        Registry::new(GroupDefaults::default())
    }

    fn doc() -> MemDocument {
        MemDocument::new(Size::new(1280.0, 720.0))
    }

    fn add_button(doc: &mut MemDocument, parent: NodeId, rect: Rect) -> NodeId {
        let button = doc.create_element("button");
        doc.append_child(parent, button);
        doc.set_rect(button, rect);
        button
    }

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

    #[test]
    fn predicate_covers_the_selector_union() {
        let mut doc = doc();
        let root = doc.root();

        let link = doc.create_element("a");
        doc.append_child(root, link);
        assert!(!is_focus_candidate(&doc, link, false));
        let _ = doc.set_attribute(link, "href", "/");
        assert!(is_focus_candidate(&doc, link, false));

        let div = doc.create_element("div");
        doc.append_child(root, div);
        assert!(!is_focus_candidate(&doc, div, false));
        let _ = doc.set_attribute(div, "role", "button");
        assert!(is_focus_candidate(&doc, div, false));

        let span = doc.create_element("span");
        doc.append_child(root, span);
        let _ = doc.set_attribute(span, "tabindex", "-1");
        assert!(!is_focus_candidate(&doc, span, false));
        let _ = doc.set_attribute(span, "tabindex", "0");
        assert!(is_focus_candidate(&doc, span, false));

        let editor = doc.create_element("div");
        doc.append_child(root, editor);
        let _ = doc.set_attribute(editor, "contenteditable", "true");
        assert!(is_focus_candidate(&doc, editor, false));

        let frame = doc.create_element("iframe");
        doc.append_child(root, frame);
        assert!(!is_focus_candidate(&doc, frame, false));
        assert!(is_focus_candidate(&doc, frame, true));

        let input = doc.create_element("input");
        doc.append_child(root, input);
        assert!(is_focus_candidate(&doc, input, false));
        let _ = doc.set_attribute(input, "disabled", "");
        assert!(!is_focus_candidate(&doc, input, false));
    }

    #[test]
    fn full_refresh_indexes_visible_candidates_in_tree_order() {
        let mut doc = doc();
        let root = doc.root();
        let a = add_button(&mut doc, root, Rect::new(0.0, 0.0, 40.0, 20.0));
        let hidden = add_button(&mut doc, root, Rect::new(0.0, 30.0, 40.0, 50.0));
        doc.set_style(hidden, StyleFlags::DISPLAY_NONE);
        let b = add_button(&mut doc, root, Rect::new(0.0, 60.0, 40.0, 80.0));

        let mut registry = registry();
        let report = registry.full_refresh(&doc, &ScanOptions::default());

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(0).unwrap().handle, a);
        assert_eq!(registry.get(1).unwrap().handle, b);
        assert!(registry.is_consistent());
        assert_eq!(report.watch_added.len(), 2);
        assert!(report.watch_removed.is_empty());
    }

    #[test]
    fn full_refresh_is_idempotent_on_a_stable_document() {
        let mut doc = doc();
        let root = doc.root();
        for i in 0..6 {
            add_button(&mut doc, root, grid_rect(i));
        }

        let mut registry = registry();
        let _ = registry.full_refresh(&doc, &ScanOptions::default());
        let order: Vec<NodeId> = registry.entries().iter().map(|e| e.handle).collect();

        let report = registry.full_refresh(&doc, &ScanOptions::default());
        let order_again: Vec<NodeId> = registry.entries().iter().map(|e| e.handle).collect();

        assert_eq!(order, order_again);
        assert!(report.watch_added.is_empty());
        assert!(report.watch_removed.is_empty());
    }

    #[test]
    fn shadow_roots_are_scanned_only_when_enabled() {
        let mut doc = doc();
        let host = doc.create_element("div");
        doc.append_child(doc.root(), host);
        let shadow = doc.attach_shadow(host);
        let inner = add_button(&mut doc, shadow, Rect::new(0.0, 0.0, 40.0, 20.0));

        let mut registry = registry();
        let _ = registry.full_refresh(&doc, &ScanOptions::default());
        assert_eq!(registry.len(), 0);

        let opts = ScanOptions {
            traverse_shadow_dom: true,
            ..ScanOptions::default()
        };
        let _ = registry.full_refresh(&doc, &opts);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(0).unwrap().handle, inner);
    }

    #[test]
    fn group_membership_and_last_focused_carry_over() {
        let mut doc = doc();
        let pane = doc.create_element("div");
        doc.append_child(doc.root(), pane);
        let _ = doc.set_attribute(pane, FOCUS_GROUP_ATTR, "menu;enter=last");
        let first = add_button(&mut doc, pane, Rect::new(0.0, 0.0, 40.0, 20.0));
        let second = add_button(&mut doc, pane, Rect::new(0.0, 30.0, 40.0, 50.0));

        let mut registry = registry();
        let _ = registry.full_refresh(&doc, &ScanOptions::default());

        let id = GroupId::new("menu").unwrap();
        assert_eq!(registry.get(0).unwrap().group, Some(id.clone()));
        assert_eq!(registry.groups().get(&id).unwrap().members.len(), 2);
        let _ = first;

        registry
            .groups_mut()
            .update_last_focused(&id, second, |_| true);

        // A new generation of the same group keeps the memory.
        let _ = registry.full_refresh(&doc, &ScanOptions::default());
        assert_eq!(registry.groups().get(&id).unwrap().last_focused, Some(second));
        assert!(registry.is_consistent());
    }

    #[test]
    fn active_element_updates_group_memory_on_refresh() {
        let mut doc = doc();
        let pane = doc.create_element("div");
        doc.append_child(doc.root(), pane);
        let _ = doc.set_attribute(pane, FOCUS_GROUP_ATTR, "menu");
        let first = add_button(&mut doc, pane, Rect::new(0.0, 0.0, 40.0, 20.0));
        let second = add_button(&mut doc, pane, Rect::new(0.0, 30.0, 40.0, 50.0));
        let _ = first;
        let _ = doc.focus(second, wayfind_document::FocusRequest::default());

        let mut registry = registry();
        let report = registry.full_refresh(&doc, &ScanOptions::default());

        assert_eq!(report.active_index, Some(1));
        let id = GroupId::new("menu").unwrap();
        assert_eq!(registry.groups().get(&id).unwrap().last_focused, Some(second));
    }

    #[test]
    fn attribute_change_inserts_removes_and_refreshes() {
        let mut doc = doc();
        let root = doc.root();
        let a = add_button(&mut doc, root, Rect::new(0.0, 0.0, 40.0, 20.0));
        let b = add_button(&mut doc, root, Rect::new(0.0, 30.0, 40.0, 50.0));
        let c = add_button(&mut doc, root, Rect::new(0.0, 60.0, 40.0, 80.0));

        let opts = ScanOptions::default();
        let mut registry = registry();
        let _ = registry.full_refresh(&doc, &opts);
        assert_eq!(registry.len(), 3);

        // Disabling the middle entry splices it out and reindexes the tail.
        let _ = doc.set_attribute(b, "disabled", "");
        assert_eq!(
            registry.apply_attribute_change(&doc, b, &opts),
            AttributeOutcome::Removed { index: 1, handle: b }
        );
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.index_of(c), Some(1));
        assert!(registry.is_consistent());

        // Re-enabling appends at the end.
        let _ = doc.remove_attribute(b, "disabled");
        assert_eq!(
            registry.apply_attribute_change(&doc, b, &opts),
            AttributeOutcome::Inserted(2)
        );
        assert!(registry.is_consistent());

        // A style-only change on a surviving entry refreshes geometry.
        doc.set_rect(a, Rect::new(5.0, 5.0, 45.0, 25.0));
        assert_eq!(
            registry.apply_attribute_change(&doc, a, &opts),
            AttributeOutcome::Refreshed(0)
        );
        assert_eq!(registry.get(0).unwrap().rect, Rect::new(5.0, 5.0, 45.0, 25.0));

        // Unrelated elements stay ignored.
        let div = doc.create_element("div");
        doc.append_child(root, div);
        assert_eq!(
            registry.apply_attribute_change(&doc, div, &opts),
            AttributeOutcome::Ignored
        );
    }

    #[test]
    fn thousand_element_refresh_finds_everything() {
        let mut doc = doc();
        let root = doc.root();
        for i in 0..1000 {
            add_button(&mut doc, root, grid_rect(i));
        }

        let mut registry = registry();
        let _ = registry.full_refresh(&doc, &ScanOptions::default());
        assert_eq!(registry.len(), 1000);
        assert!(registry.is_consistent());
    }

    #[test]
    fn sentinels_come_from_matching_containers() {
        let mut doc = doc();
        let list = doc.create_element("div");
        doc.append_child(doc.root(), list);
        let _ = doc.set_attribute(list, "class", "virtual-list");
        let mut children = Vec::new();
        for i in 0..7 {
            children.push(add_button(&mut doc, list, grid_rect(i)));
        }

        let opts = ScanOptions {
            observe_virtual_containers: true,
            virtual_container_selectors: alloc::vec![
                ".virtual-list".to_string(),
                "ul !! broken".to_string(),
            ],
            ..ScanOptions::default()
        };
        let mut registry = registry();
        let _ = registry.full_refresh(&doc, &opts);

        let sentinels = registry.sentinels();
        assert_eq!(sentinels.containers(), &[list]);
        assert_eq!(
            sentinels.watches(),
            &[children[0], children[3], children[6]]
        );
        assert!(sentinels.is_sentinel(children[3]));
        assert!(!sentinels.is_sentinel(children[1]));
    }
}
