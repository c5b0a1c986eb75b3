// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wayfind Groups: hierarchical navigation regions.
//!
//! Pages declare focus groups with a `data-focus-group="id;k=v;k=v"`
//! attribute on a container element. The id is a dot-separated path
//! (`sidebar.menu.items`), and the hierarchy follows from the ids alone:
//! after a rebuild, each group's parent is the existing group whose id is its
//! longest proper dotted prefix. Cycles are impossible by construction, since
//! a proper prefix always has fewer segments.
//!
//! A [`GroupSet`] is rebuilt from scratch on every full registry refresh, but
//! remembers each group's last-focused member across generations keyed by id,
//! which is what makes `enter: last` survive DOM recycling.
//!
//! ## Declaration syntax
//!
//! ```rust
//! use wayfind_groups::{EnterMode, GroupBoundary, parse_declaration};
//!
//! let decl = parse_declaration("sidebar.menu;boundary=wrap;enter=last").unwrap();
//! assert_eq!(decl.id.as_str(), "sidebar.menu");
//! assert_eq!(decl.id.depth(), 2);
//! assert_eq!(decl.options.boundary, Some(GroupBoundary::Wrap));
//! assert_eq!(decl.options.enter, Some(EnterMode::Last));
//! ```
//!
//! Recognized keys are `boundary` (`exit`, `contain`, `wrap`, `stop`),
//! `enter` (`default`, `first`, `last`), and `remember` (`true`/`false`).
//! Unknown keys and unknown values are ignored. Options a group does not set
//! are inherited from its parent when the group's `inherit_options` is on,
//! except `priority`, which never inherits; whatever remains unset falls back
//! to the host-configured [`GroupDefaults`].
//!
//! This crate is `no_std` and uses `alloc`. It is generic over the member
//! handle `H` so it can sit under any document adapter.

#![no_std]

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;

/// A dot-separated group identifier, e.g. `sidebar.menu.items`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(String);

impl GroupId {
    /// Parse an id, rejecting empty ids and empty segments.
    #[must_use]
    pub fn new(id: &str) -> Option<Self> {
        let id = id.trim();
        if id.is_empty() || id.split('.').any(|seg| seg.is_empty()) {
            return None;
        }
        Some(Self(id.to_string()))
    }

    /// The raw id text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of dotted segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.split('.').count()
    }

    /// Whether `self` is a proper dotted prefix of `other`
    /// (`sidebar` prefixes `sidebar.menu` but not `sidebarx`).
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0.as_bytes()[self.0.len()] == b'.'
    }
}

impl core::fmt::Display for GroupId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What happens when navigation reaches the edge of a group.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum GroupBoundary {
    /// Navigation may leave the group.
    #[default]
    Exit,
    /// Candidates outside the group are rejected.
    Contain,
    /// Navigation wraps to the group's opposite edge.
    Wrap,
    /// Navigation stops dead at the edge.
    Stop,
}

/// Which member receives focus when navigation enters a group.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum EnterMode {
    /// No preference; scoring decides.
    #[default]
    Default,
    /// The first member.
    First,
    /// The remembered last-focused member.
    Last,
}

/// Raw per-group options; `None` means "not set here, consult inheritance".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupOptions {
    /// Edge policy.
    pub boundary: Option<GroupBoundary>,
    /// Entry policy.
    pub enter: Option<EnterMode>,
    /// Whether the group tracks its last-focused member.
    pub remember: Option<bool>,
    /// Host-assigned priority. Never inherited.
    pub priority: Option<f64>,
    /// Whether unset keys inherit from the parent group; `None` follows
    /// [`GroupDefaults::inherit_options`].
    pub inherit_options: Option<bool>,
}

impl GroupOptions {
    /// Options that neither set nor inherit anything.
    #[must_use]
    pub fn isolated() -> Self {
        Self {
            inherit_options: Some(false),
            ..Self::default()
        }
    }
}

/// Fallbacks applied after per-group options and inheritance.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GroupDefaults {
    /// Default edge policy.
    pub boundary: GroupBoundary,
    /// Default entry policy.
    pub enter: EnterMode,
    /// Default last-focused tracking.
    pub remember: bool,
    /// Default priority.
    pub priority: f64,
    /// Default inheritance switch for declared groups.
    pub inherit_options: bool,
}

impl Default for GroupDefaults {
    fn default() -> Self {
        Self {
            boundary: GroupBoundary::Exit,
            enter: EnterMode::Default,
            remember: true,
            priority: 0.0,
            inherit_options: true,
        }
    }
}

/// Fully resolved options for one group.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EffectiveOptions {
    /// Edge policy.
    pub boundary: GroupBoundary,
    /// Entry policy.
    pub enter: EnterMode,
    /// Last-focused tracking.
    pub remember: bool,
    /// Priority (never inherited).
    pub priority: f64,
}

impl EffectiveOptions {
    /// Whether edge navigation wraps within the group.
    #[must_use]
    pub fn should_wrap(&self) -> bool {
        self.boundary == GroupBoundary::Wrap
    }

    /// Whether navigation may leave the group.
    #[must_use]
    pub fn can_exit(&self) -> bool {
        matches!(self.boundary, GroupBoundary::Exit | GroupBoundary::Wrap)
    }
}

/// A parsed `data-focus-group` declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupDeclaration {
    /// The declared group id.
    pub id: GroupId,
    /// The declared options.
    pub options: GroupOptions,
}

/// Parse a `data-focus-group` attribute value.
///
/// Returns `None` when the id part is empty or malformed. Unknown keys and
/// unrecognized values are skipped.
#[must_use]
pub fn parse_declaration(value: &str) -> Option<GroupDeclaration> {
    let mut parts = value.split(';');
    let id = GroupId::new(parts.next()?)?;
    let mut options = GroupOptions::default();
    for part in parts {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let Some((key, val)) = part.split_once('=') else {
            log::debug!("focus-group option without value ignored: {part:?}");
            continue;
        };
        match (key.trim(), val.trim()) {
            ("boundary", "exit") => options.boundary = Some(GroupBoundary::Exit),
            ("boundary", "contain") => options.boundary = Some(GroupBoundary::Contain),
            ("boundary", "wrap") => options.boundary = Some(GroupBoundary::Wrap),
            ("boundary", "stop") => options.boundary = Some(GroupBoundary::Stop),
            ("enter", "default") => options.enter = Some(EnterMode::Default),
            ("enter", "first") => options.enter = Some(EnterMode::First),
            ("enter", "last") => options.enter = Some(EnterMode::Last),
            ("remember", "true") => options.remember = Some(true),
            ("remember", "false") => options.remember = Some(false),
            (key, val) => {
                log::debug!("unrecognized focus-group option ignored: {key}={val}");
            }
        }
    }
    Some(GroupDeclaration { id, options })
}

/// One navigation region.
#[derive(Clone, Debug)]
pub struct FocusGroup<H> {
    /// The declared id.
    pub id: GroupId,
    /// The container element carrying the declaration.
    pub container: H,
    /// Members, in registry order.
    pub members: Vec<H>,
    /// Cached segment count of `id`.
    pub depth: usize,
    /// Parent group, by id.
    pub parent: Option<GroupId>,
    /// Child groups, by id.
    pub children: Vec<GroupId>,
    /// Remembered last-focused member.
    pub last_focused: Option<H>,
    /// Raw declared options.
    pub options: GroupOptions,
}

/// The set of groups for one registry generation.
///
/// Rebuilt on every full refresh via [`GroupSet::start_rebuild`] /
/// [`GroupSet::declare`] / [`GroupSet::add_member`] /
/// [`GroupSet::finish_rebuild`]; last-focused memory carries across
/// generations by id.
#[derive(Clone, Debug)]
pub struct GroupSet<H> {
    groups: HashMap<GroupId, FocusGroup<H>>,
    remembered: HashMap<GroupId, H>,
    defaults: GroupDefaults,
}

impl<H: Copy + Eq + Hash + Debug> GroupSet<H> {
    /// An empty set with the given fallbacks.
    #[must_use]
    pub fn new(defaults: GroupDefaults) -> Self {
        Self {
            groups: HashMap::new(),
            remembered: HashMap::new(),
            defaults,
        }
    }

    /// The configured fallbacks.
    #[must_use]
    pub fn defaults(&self) -> GroupDefaults {
        self.defaults
    }

    /// Drop the current generation, keeping last-focused memory.
    pub fn start_rebuild(&mut self) {
        for (id, group) in self.groups.drain() {
            if let Some(last) = group.last_focused {
                self.remembered.insert(id, last);
            }
        }
    }

    /// Register a declaration found during the scan. The first declaration
    /// of an id wins; later containers with the same id are ignored.
    pub fn declare(&mut self, decl: GroupDeclaration, container: H) {
        let depth = decl.id.depth();
        self.groups.entry(decl.id.clone()).or_insert(FocusGroup {
            id: decl.id,
            container,
            members: Vec::new(),
            depth,
            parent: None,
            children: Vec::new(),
            last_focused: None,
            options: decl.options,
        });
    }

    /// Append a member to a declared group. Returns whether the group exists.
    pub fn add_member(&mut self, id: &GroupId, member: H) -> bool {
        match self.groups.get_mut(id) {
            Some(group) => {
                if !group.members.contains(&member) {
                    group.members.push(member);
                }
                true
            }
            None => false,
        }
    }

    /// Link the hierarchy and restore last-focused memory.
    ///
    /// Parents are attached depth-ascending: each group's parent is the
    /// existing group with the longest id that is a proper dotted prefix of
    /// its own. Remembered members are restored only while `is_attached`
    /// still holds for them.
    pub fn finish_rebuild(&mut self, mut is_attached: impl FnMut(H) -> bool) {
        let mut ids: Vec<GroupId> = self.groups.keys().cloned().collect();
        ids.sort_by_key(GroupId::depth);

        for id in &ids {
            let parent = ids
                .iter()
                .filter(|candidate| candidate.is_prefix_of(id))
                .max_by_key(|candidate| candidate.depth())
                .cloned();
            if let Some(parent_id) = parent {
                if let Some(group) = self.groups.get_mut(&parent_id) {
                    group.children.push(id.clone());
                }
                if let Some(group) = self.groups.get_mut(id) {
                    group.parent = Some(parent_id);
                }
            }
        }

        for (id, last) in self.remembered.drain() {
            if let Some(group) = self.groups.get_mut(&id)
                && is_attached(last)
            {
                group.last_focused = Some(last);
            }
        }
    }

    /// Look up a group.
    #[must_use]
    pub fn get(&self, id: &GroupId) -> Option<&FocusGroup<H>> {
        self.groups.get(id)
    }

    /// Iterate over all groups.
    pub fn iter(&self) -> impl Iterator<Item = &FocusGroup<H>> {
        self.groups.values()
    }

    /// Number of groups in the current generation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the current generation has no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Remove the members of `id` failing the predicate.
    pub fn retain_members(&mut self, id: &GroupId, f: impl Fn(&H) -> bool) {
        if let Some(group) = self.groups.get_mut(id) {
            group.members.retain(|h| f(h));
        }
    }

    /// Resolve the effective options of `id`.
    ///
    /// Unset keys inherit from ancestors while `inherit_options` holds along
    /// the chain; `priority` never inherits. Unknown ids resolve to the
    /// defaults.
    #[must_use]
    pub fn effective_options(&self, id: &GroupId) -> EffectiveOptions {
        let mut boundary = None;
        let mut enter = None;
        let mut remember = None;
        let mut priority = None;
        let mut cursor = self.groups.get(id);
        let mut inherited = false;

        while let Some(group) = cursor {
            boundary = boundary.or(group.options.boundary);
            enter = enter.or(group.options.enter);
            remember = remember.or(group.options.remember);
            if !inherited {
                priority = group.options.priority;
            }
            inherited = true;
            if !group
                .options
                .inherit_options
                .unwrap_or(self.defaults.inherit_options)
            {
                break;
            }
            cursor = group.parent.as_ref().and_then(|p| self.groups.get(p));
        }

        EffectiveOptions {
            boundary: boundary.unwrap_or(self.defaults.boundary),
            enter: enter.unwrap_or(self.defaults.enter),
            remember: remember.unwrap_or(self.defaults.remember),
            priority: priority.unwrap_or(self.defaults.priority),
        }
    }

    /// Record `member` as the last-focused member of `id`, refreshing stale
    /// ancestors on the way up.
    ///
    /// An ancestor is stale when it has no remembered member or the
    /// remembered member is no longer attached; stale ancestors adopt
    /// `member`, since it is by construction enclosed by their containers.
    pub fn update_last_focused(
        &mut self,
        id: &GroupId,
        member: H,
        mut is_attached: impl FnMut(H) -> bool,
    ) {
        // Collect the chain first; the walk cannot cycle because parents are
        // strict prefixes.
        let mut chain = Vec::new();
        let mut cursor = Some(id.clone());
        while let Some(current) = cursor {
            let Some(group) = self.groups.get(&current) else {
                break;
            };
            cursor = group.parent.clone();
            chain.push(current);
        }
        for (i, gid) in chain.iter().enumerate() {
            if !self.effective_options(gid).remember {
                continue;
            }
            let Some(group) = self.groups.get_mut(gid) else {
                continue;
            };
            let stale = group.last_focused.is_none_or(|last| !is_attached(last));
            if i == 0 || stale {
                group.last_focused = Some(member);
            }
        }
    }

    /// The member navigation should land on when entering `id`.
    ///
    /// With `enter: last`, the remembered member wins while it is still
    /// attached; otherwise (and for `first`/`default`) the first member.
    #[must_use]
    pub fn preferred_entry(&self, id: &GroupId, mut is_attached: impl FnMut(H) -> bool) -> Option<H> {
        let group = self.groups.get(id)?;
        if self.effective_options(id).enter == EnterMode::Last
            && let Some(last) = group.last_focused
            && is_attached(last)
        {
            return Some(last);
        }
        group.members.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> GroupSet<u32> {
        GroupSet::new(GroupDefaults::default())
    }

    fn rebuild(set: &mut GroupSet<u32>, decls: &[(&str, u32)]) {
        set.start_rebuild();
        for (text, container) in decls {
            let decl = parse_declaration(text).unwrap();
            set.declare(decl, *container);
        }
        set.finish_rebuild(|_| true);
    }

    #[test]
    fn declaration_parsing() {
        let decl = parse_declaration("nav.tools;boundary=contain;remember=false").unwrap();
        assert_eq!(decl.id.as_str(), "nav.tools");
        assert_eq!(decl.options.boundary, Some(GroupBoundary::Contain));
        assert_eq!(decl.options.remember, Some(false));
        assert_eq!(decl.options.enter, None);

        // Unknown keys and values are skipped, not fatal.
        let decl = parse_declaration("nav;boundary=sideways;sparkle=yes").unwrap();
        assert_eq!(decl.options, GroupOptions::default());

        assert!(parse_declaration(";boundary=exit").is_none());
        assert!(parse_declaration("a..b").is_none());
        assert!(parse_declaration("   ").is_none());
    }

    #[test]
    fn hierarchy_links_by_longest_prefix() {
        let mut set = set();
        rebuild(
            &mut set,
            &[("app", 1), ("app.side", 2), ("app.side.menu", 3), ("other", 4)],
        );

        let menu = GroupId::new("app.side.menu").unwrap();
        let side = GroupId::new("app.side").unwrap();
        let app = GroupId::new("app").unwrap();

        assert_eq!(set.get(&menu).unwrap().parent, Some(side.clone()));
        assert_eq!(set.get(&side).unwrap().parent, Some(app.clone()));
        assert_eq!(set.get(&app).unwrap().parent, None);
        assert!(set.get(&app).unwrap().children.contains(&side));

        // Depth invariant: parent depth + 1 == child depth for direct chains.
        assert_eq!(set.get(&menu).unwrap().depth, set.get(&side).unwrap().depth + 1);
    }

    #[test]
    fn hierarchy_skips_missing_intermediate_levels() {
        let mut set = set();
        rebuild(&mut set, &[("app", 1), ("app.side.menu", 3)]);

        let menu = GroupId::new("app.side.menu").unwrap();
        let app = GroupId::new("app").unwrap();
        assert_eq!(set.get(&menu).unwrap().parent, Some(app));
    }

    #[test]
    fn options_inherit_except_priority() {
        let mut set = set();
        set.start_rebuild();
        let mut parent = parse_declaration("app;boundary=wrap").unwrap();
        parent.options.priority = Some(7.0);
        set.declare(parent, 1);
        set.declare(parse_declaration("app.menu;enter=last").unwrap(), 2);
        set.finish_rebuild(|_| true);

        let eff = set.effective_options(&GroupId::new("app.menu").unwrap());
        assert_eq!(eff.boundary, GroupBoundary::Wrap);
        assert_eq!(eff.enter, EnterMode::Last);
        assert_eq!(eff.priority, 0.0);
        assert!(eff.should_wrap());
        assert!(eff.can_exit());

        let eff = set.effective_options(&GroupId::new("app").unwrap());
        assert_eq!(eff.priority, 7.0);
    }

    #[test]
    fn boundary_policies() {
        let mut set = set();
        rebuild(&mut set, &[("trap;boundary=contain", 1), ("edge;boundary=stop", 2)]);
        let trap = set.effective_options(&GroupId::new("trap").unwrap());
        assert!(!trap.can_exit());
        assert!(!trap.should_wrap());
        let edge = set.effective_options(&GroupId::new("edge").unwrap());
        assert!(!edge.can_exit());
    }

    #[test]
    fn last_focused_survives_rebuild_by_id() {
        let mut set = set();
        rebuild(&mut set, &[("list;enter=last", 1)]);
        let list = GroupId::new("list").unwrap();
        set.add_member(&list, 10);
        set.add_member(&list, 11);
        set.update_last_focused(&list, 11, |_| true);

        rebuild(&mut set, &[("list;enter=last", 1)]);
        set.add_member(&list, 10);
        set.add_member(&list, 11);
        assert_eq!(set.get(&list).unwrap().last_focused, Some(11));
        assert_eq!(set.preferred_entry(&list, |_| true), Some(11));
    }

    #[test]
    fn detached_memory_is_dropped_on_rebuild() {
        let mut set = set();
        rebuild(&mut set, &[("list", 1)]);
        let list = GroupId::new("list").unwrap();
        set.add_member(&list, 10);
        set.update_last_focused(&list, 10, |_| true);

        set.start_rebuild();
        set.declare(parse_declaration("list").unwrap(), 1);
        set.finish_rebuild(|h| h != 10);
        assert_eq!(set.get(&list).unwrap().last_focused, None);
    }

    #[test]
    fn preferred_entry_falls_back_to_first_member() {
        let mut set = set();
        rebuild(&mut set, &[("list;enter=last", 1)]);
        let list = GroupId::new("list").unwrap();
        set.add_member(&list, 10);
        set.add_member(&list, 11);

        // No memory yet: first member.
        assert_eq!(set.preferred_entry(&list, |_| true), Some(10));

        // Memory exists but the element is gone: first member again.
        set.update_last_focused(&list, 11, |_| true);
        assert_eq!(set.preferred_entry(&list, |h| h != 11), Some(10));
    }

    #[test]
    fn stale_ancestors_adopt_the_focused_member() {
        let mut set = set();
        rebuild(&mut set, &[("app", 1), ("app.menu", 2)]);
        let app = GroupId::new("app").unwrap();
        let menu = GroupId::new("app.menu").unwrap();
        set.add_member(&app, 5);
        set.add_member(&menu, 20);

        set.update_last_focused(&menu, 20, |_| true);
        assert_eq!(set.get(&app).unwrap().last_focused, Some(20));

        // A fresh ancestor memory is not overwritten.
        set.update_last_focused(&app, 5, |_| true);
        set.update_last_focused(&menu, 20, |_| true);
        assert_eq!(set.get(&app).unwrap().last_focused, Some(5));
    }

    #[test]
    fn member_dedup() {
        let mut set = set();
        rebuild(&mut set, &[("list", 1)]);
        let list = GroupId::new("list").unwrap();
        assert!(set.add_member(&list, 10));
        assert!(set.add_member(&list, 10));
        assert_eq!(set.get(&list).unwrap().members.len(), 1);
        assert!(!set.add_member(&GroupId::new("ghost").unwrap(), 10));
    }
}
