// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Virtual-list container detection and sentinel nomination.
//!
//! Virtualized scrollers recycle DOM as the user scrolls, which silently
//! invalidates the registry. To hear about it early, the registry matches
//! host-configured selectors against the scanned tree and nominates the
//! first, middle, and last child of each matching container as *sentinels*:
//! elements the host observes for intersection (with a generous root margin)
//! so that any of them entering or leaving the expanded viewport band
//! triggers a debounced full refresh.
//!
//! An invalid selector is skipped with a warning; the remaining selectors
//! keep working.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashSet;
use smallvec::SmallVec;

use wayfind_document::Document;

/// The sentinel watch set of one registry generation.
#[derive(Clone, Debug, Default)]
pub struct SentinelSet<H> {
    containers: Vec<H>,
    watches: Vec<H>,
    watch_set: HashSet<H>,
}

impl<H: Copy + Eq + Hash + Debug> SentinelSet<H> {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            containers: Vec::new(),
            watches: Vec::new(),
            watch_set: HashSet::new(),
        }
    }

    /// Matched virtual-list containers, in scan order.
    #[must_use]
    pub fn containers(&self) -> &[H] {
        &self.containers
    }

    /// Sentinel children the host should observe for intersection.
    #[must_use]
    pub fn watches(&self) -> &[H] {
        &self.watches
    }

    /// Whether `el` is one of the nominated sentinels.
    #[must_use]
    pub fn is_sentinel(&self, el: H) -> bool {
        self.watch_set.contains(&el)
    }

    /// Whether no containers matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}

/// Match `selectors` over the scanned elements and nominate sentinels.
pub(crate) fn locate<D>(
    doc: &D,
    scanned: &[D::Handle],
    selectors: &[String],
) -> SentinelSet<D::Handle>
where
    D: Document,
{
    let mut set = SentinelSet::new();
    let mut invalid: SmallVec<[usize; 4]> = SmallVec::new();

    for &el in scanned {
        for (i, selector) in selectors.iter().enumerate() {
            if invalid.contains(&i) {
                continue;
            }
            match doc.matches_selector(el, selector) {
                Ok(true) => {
                    set.containers.push(el);
                    break;
                }
                Ok(false) => {}
                Err(err) => {
                    log::warn!("skipping virtual-container selector: {err}");
                    invalid.push(i);
                }
            }
        }
    }

    for &container in &set.containers {
        let children = doc.children(container);
        let picks: SmallVec<[D::Handle; 3]> = match children.len() {
            0 => SmallVec::new(),
            1 => SmallVec::from_slice(&[children[0]]),
            2 => SmallVec::from_slice(&[children[0], children[1]]),
            n => SmallVec::from_slice(&[children[0], children[n / 2], children[n - 1]]),
        };
        for pick in picks {
            if set.watch_set.insert(pick) {
                set.watches.push(pick);
            }
        }
    }

    set
}
