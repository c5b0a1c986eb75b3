// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory [`Document`] implementation.
//!
//! [`MemDocument`] is the reference adapter: a small mutable element tree
//! with attributes, style flags, custom properties, rects, shadow roots, and
//! an active element. The workspace's tests, benches, and demos drive the
//! whole engine against it, and its mutation helpers return the
//! [`MutationRecord`]s a platform mutation observer would deliver for the
//! same edit, so a test can mutate the tree and feed the records straight to
//! the engine driver.
//!
//! ```rust
//! use kurbo::{Rect, Size};
//! use wayfind_document::{Document, MutationKind, mem::MemDocument};
//!
//! let mut doc = MemDocument::new(Size::new(800.0, 600.0));
//! let button = doc.create_element("button");
//! let record = doc.append_child(doc.root(), button);
//! assert_eq!(record.kind, MutationKind::ChildList);
//!
//! let record = doc.set_attribute(button, "tabindex", "0");
//! assert_eq!(record.kind, MutationKind::Attribute("tabindex".into()));
//! ```
//!
//! Focus failures can be simulated for exercising the engine's retry path:
//! [`MemDocument::reject_prevent_scroll`] makes `prevent_scroll` requests
//! fail while plain requests succeed, and [`MemDocument::fail_next_focus`]
//! rejects the next *n* focus calls outright.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::{Rect, Size};

use crate::{
    Document, ElementKind, FocusError, FocusRequest, FrameworkHint, MutationKind, MutationRecord,
    SelectorError, StyleFlags,
};

/// Generational handle for a [`MemDocument`] element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32, u32);

impl NodeId {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "slot indices are intentionally 32-bit"
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct MemNode {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// The shadow host this node is a root of, if it is a shadow root.
    shadow_host: Option<NodeId>,
    shadow_root: Option<NodeId>,
    tag: String,
    attrs: HashMap<String, String>,
    custom_props: HashMap<String, String>,
    style: StyleFlags,
    rect: Rect,
    text: Option<String>,
}

impl MemNode {
    fn new(generation: u32, tag: &str) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            shadow_host: None,
            shadow_root: None,
            tag: tag.to_string(),
            attrs: HashMap::new(),
            custom_props: HashMap::new(),
            style: StyleFlags::empty(),
            rect: Rect::ZERO,
            text: None,
        }
    }
}

/// In-memory document tree implementing [`Document`].
#[derive(Clone, Debug)]
pub struct MemDocument {
    nodes: Vec<Option<MemNode>>,
    /// Last generation per slot; persists across frees so recycled slots
    /// never resurrect old handles.
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: NodeId,
    viewport: Size,
    active: Option<NodeId>,
    framework: FrameworkHint,
    reject_prevent_scroll: bool,
    focus_failures: u32,
}

impl MemDocument {
    /// Create a document with an empty root and the given viewport.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: NodeId::new(0, 0),
            viewport,
            active: None,
            framework: FrameworkHint::Unknown,
            reject_prevent_scroll: false,
            focus_failures: 0,
        };
        doc.root = doc.create_element("body");
        doc
    }

    /// Allocate a new, unattached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx] + 1;
            self.generations[idx] = generation;
            self.nodes[idx] = Some(MemNode::new(generation, tag));
            NodeId::new(idx, generation)
        } else {
            self.nodes.push(Some(MemNode::new(1, tag)));
            self.generations.push(1);
            NodeId::new(self.nodes.len() - 1, 1)
        }
    }

    /// Append `child` under `parent`. Returns the childList record.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> MutationRecord<NodeId> {
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        MutationRecord {
            target: parent,
            kind: MutationKind::ChildList,
        }
    }

    /// Remove `el` and its whole subtree. Returns the childList record for
    /// the former parent (the root cannot be removed).
    pub fn remove_subtree(&mut self, el: NodeId) -> Option<MutationRecord<NodeId>> {
        if el == self.root {
            return None;
        }
        let parent = self.node(el)?.parent?;
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|&c| c != el);
        }
        self.free_recursive(el);
        Some(MutationRecord {
            target: parent,
            kind: MutationKind::ChildList,
        })
    }

    fn free_recursive(&mut self, el: NodeId) {
        let Some(node) = self.node(el) else { return };
        let children = node.children.clone();
        let shadow = node.shadow_root;
        for child in children {
            self.free_recursive(child);
        }
        if let Some(shadow) = shadow {
            self.free_recursive(shadow);
        }
        if self.active == Some(el) {
            self.active = None;
        }
        self.nodes[el.idx()] = None;
        self.free_list.push(el.idx());
    }

    /// Attach (or return the existing) shadow root to `host`.
    pub fn attach_shadow(&mut self, host: NodeId) -> NodeId {
        if let Some(existing) = self.node(host).and_then(|n| n.shadow_root) {
            return existing;
        }
        let root = self.create_element("#shadow-root");
        if let Some(node) = self.node_mut(root) {
            node.shadow_host = Some(host);
        }
        if let Some(node) = self.node_mut(host) {
            node.shadow_root = Some(root);
        }
        root
    }

    /// Set attribute `name` on `el`. Returns the attribute record.
    pub fn set_attribute(&mut self, el: NodeId, name: &str, value: &str) -> MutationRecord<NodeId> {
        if let Some(node) = self.node_mut(el) {
            node.attrs.insert(name.to_string(), value.to_string());
        }
        MutationRecord {
            target: el,
            kind: MutationKind::Attribute(name.to_string()),
        }
    }

    /// Remove attribute `name` from `el`. Returns the attribute record.
    pub fn remove_attribute(&mut self, el: NodeId, name: &str) -> MutationRecord<NodeId> {
        if let Some(node) = self.node_mut(el) {
            node.attrs.remove(name);
        }
        MutationRecord {
            target: el,
            kind: MutationKind::Attribute(name.to_string()),
        }
    }

    /// Replace the explicit style flags of `el`. Returns the style record.
    ///
    /// `DISABLED` and `ARIA_HIDDEN` are derived from attributes and merged in
    /// by [`Document::style`]; they do not need to be set here.
    pub fn set_style(&mut self, el: NodeId, style: StyleFlags) -> MutationRecord<NodeId> {
        if let Some(node) = self.node_mut(el) {
            node.style = style;
        }
        MutationRecord {
            target: el,
            kind: MutationKind::Attribute("style".to_string()),
        }
    }

    /// Set CSS custom property `name` on `el`.
    pub fn set_custom_property(&mut self, el: NodeId, name: &str, value: &str) {
        if let Some(node) = self.node_mut(el) {
            node.custom_props.insert(name.to_string(), value.to_string());
        }
    }

    /// Set the layout rect of `el`.
    pub fn set_rect(&mut self, el: NodeId, rect: Rect) {
        if let Some(node) = self.node_mut(el) {
            node.rect = rect;
        }
    }

    /// Set the own text content of `el`.
    pub fn set_text(&mut self, el: NodeId, text: &str) {
        if let Some(node) = self.node_mut(el) {
            node.text = Some(text.to_string());
        }
    }

    /// Change the viewport size.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Set the framework fingerprint reported to the engine.
    pub fn set_framework_hint(&mut self, hint: FrameworkHint) {
        self.framework = hint;
    }

    /// Clear platform focus without going through [`Document::focus`].
    pub fn blur(&mut self) {
        self.active = None;
    }

    /// Make `prevent_scroll` focus requests fail with
    /// [`FocusError::UnsupportedOptions`].
    pub fn reject_prevent_scroll(&mut self, reject: bool) {
        self.reject_prevent_scroll = reject;
    }

    /// Reject the next `n` focus calls outright with [`FocusError::Rejected`].
    pub fn fail_next_focus(&mut self, n: u32) {
        self.focus_failures = n;
    }

    /// Number of live elements (including the root and shadow roots).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Whether the document holds only the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    fn node(&self, el: NodeId) -> Option<&MemNode> {
        let node = self.nodes.get(el.idx())?.as_ref()?;
        (node.generation == el.1).then_some(node)
    }

    fn node_mut(&mut self, el: NodeId) -> Option<&mut MemNode> {
        let node = self.nodes.get_mut(el.idx())?.as_mut()?;
        (node.generation == el.1).then_some(node)
    }

    fn matches_compound(&self, el: NodeId, selector: &str) -> Result<bool, SelectorError> {
        let Some(node) = self.node(el) else {
            return Ok(false);
        };
        for part in parse_selector(selector)? {
            let ok = match part {
                SelectorPart::Tag(tag) => node.tag.eq_ignore_ascii_case(tag),
                SelectorPart::Id(id) => node.attrs.get("id").is_some_and(|v| v == id),
                SelectorPart::Class(class) => node
                    .attrs
                    .get("class")
                    .is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class)),
                SelectorPart::Attr(name, None) => node.attrs.contains_key(name),
                SelectorPart::Attr(name, Some(value)) => {
                    node.attrs.get(name).is_some_and(|v| v == value)
                }
            };
            if !ok {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Document for MemDocument {
    type Handle = NodeId;

    fn root(&self) -> NodeId {
        self.root
    }

    fn parent(&self, el: NodeId) -> Option<NodeId> {
        let node = self.node(el)?;
        // A shadow root reports its host as parent so ancestry walks
        // (aria-hidden, scroll keys, containment) cross the boundary.
        node.parent.or(node.shadow_host)
    }

    fn children(&self, el: NodeId) -> Vec<NodeId> {
        self.node(el).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn shadow_root(&self, el: NodeId) -> Option<NodeId> {
        self.node(el)?.shadow_root
    }

    fn is_connected(&self, el: NodeId) -> bool {
        let Some(node) = self.node(el) else {
            return false;
        };
        match (node.parent, node.shadow_host) {
            (Some(parent), _) => self.is_connected(parent),
            (None, Some(host)) => self.is_connected(host),
            (None, None) => el == self.root,
        }
    }

    fn kind(&self, el: NodeId) -> ElementKind {
        let Some(node) = self.node(el) else {
            return ElementKind::Other;
        };
        match node.tag.to_ascii_lowercase().as_str() {
            "a" => ElementKind::Anchor,
            "button" => ElementKind::Button,
            "input" => ElementKind::Input,
            "select" => ElementKind::Select,
            "textarea" => ElementKind::TextArea,
            "iframe" => ElementKind::Frame,
            _ => ElementKind::Other,
        }
    }

    fn tag_name(&self, el: NodeId) -> Option<&str> {
        self.node(el).map(|n| n.tag.as_str())
    }

    fn attribute(&self, el: NodeId, name: &str) -> Option<&str> {
        self.node(el)?.attrs.get(name).map(String::as_str)
    }

    fn style(&self, el: NodeId) -> StyleFlags {
        let Some(node) = self.node(el) else {
            return StyleFlags::empty();
        };
        let mut style = node.style;
        if node.attrs.contains_key("disabled") {
            style |= StyleFlags::DISABLED;
        }
        if node.attrs.contains_key("hidden") {
            style |= StyleFlags::DISPLAY_NONE;
        }
        if node.attrs.get("aria-hidden").is_some_and(|v| v == "true") {
            style |= StyleFlags::ARIA_HIDDEN;
        }
        style
    }

    fn custom_property(&self, el: NodeId, name: &str) -> Option<&str> {
        self.node(el)?.custom_props.get(name).map(String::as_str)
    }

    fn rect(&self, el: NodeId) -> Rect {
        self.node(el).map(|n| n.rect).unwrap_or(Rect::ZERO)
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    fn focus(&mut self, el: NodeId, request: FocusRequest) -> Result<(), FocusError> {
        if !self.is_connected(el) {
            return Err(FocusError::Detached);
        }
        if self.focus_failures > 0 {
            self.focus_failures -= 1;
            return Err(FocusError::Rejected);
        }
        if request.prevent_scroll && self.reject_prevent_scroll {
            return Err(FocusError::UnsupportedOptions);
        }
        self.active = Some(el);
        Ok(())
    }

    fn matches_selector(&self, el: NodeId, selector: &str) -> Result<bool, SelectorError> {
        self.matches_compound(el, selector)
    }

    fn text_excerpt(&self, el: NodeId, max_len: usize) -> Option<String> {
        let text = self.node(el)?.text.as_deref()?;
        Some(text.chars().take(max_len).collect())
    }

    fn framework_hint(&self) -> FrameworkHint {
        self.framework
    }
}

#[derive(Debug)]
enum SelectorPart<'s> {
    Tag(&'s str),
    Id(&'s str),
    Class(&'s str),
    Attr(&'s str, Option<&'s str>),
}

/// Parse one compound selector: an optional tag name followed by any number
/// of `#id`, `.class`, `[attr]`, or `[attr=value]` parts. Combinators and
/// pseudo-classes are rejected.
fn parse_selector(selector: &str) -> Result<Vec<SelectorPart<'_>>, SelectorError> {
    let err = || SelectorError {
        selector: selector.to_string(),
    };
    let s = selector.trim();
    if s.is_empty() {
        return Err(err());
    }
    let mut parts = Vec::new();
    let mut rest = s;
    if let Some(end) = rest.find(['#', '.', '['])
        && end > 0
    {
        parts.push(SelectorPart::Tag(&rest[..end]));
        rest = &rest[end..];
    } else if !rest.starts_with(['#', '.', '[']) {
        parts.push(SelectorPart::Tag(rest));
        rest = "";
    }
    if parts
        .iter()
        .any(|p| matches!(p, SelectorPart::Tag(t) if !is_ident(t)))
    {
        return Err(err());
    }
    while !rest.is_empty() {
        let (head, tail) = rest.split_at(1);
        match head {
            "#" | "." => {
                let end = tail.find(['#', '.', '[']).unwrap_or(tail.len());
                let name = &tail[..end];
                if !is_ident(name) {
                    return Err(err());
                }
                parts.push(if head == "#" {
                    SelectorPart::Id(name)
                } else {
                    SelectorPart::Class(name)
                });
                rest = &tail[end..];
            }
            "[" => {
                let end = tail.find(']').ok_or_else(err)?;
                let body = &tail[..end];
                let part = match body.split_once('=') {
                    Some((name, value)) => {
                        let value = value.trim_matches('"').trim_matches('\'');
                        SelectorPart::Attr(name, Some(value))
                    }
                    None => SelectorPart::Attr(body, None),
                };
                if let SelectorPart::Attr(name, _) = &part
                    && !is_ident(name)
                {
                    return Err(err());
                }
                parts.push(part);
                rest = &tail[end + 1..];
            }
            _ => return Err(err()),
        }
    }
    Ok(parts)
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
