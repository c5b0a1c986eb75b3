// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The cooperative task queue.
//!
//! All of the engine's delayed work is expressed as keyed tasks in one of
//! three classes: microtasks (run when the host's current task unwinds),
//! animation-frame tasks, and timers with absolute deadlines. Scheduling a
//! task under an occupied key replaces the pending task, which is how
//! debounces restart and how a newer overlay request supersedes an older
//! one; cancelling a key drops it.
//!
//! The engine owns one [`Scheduler`] and interprets the keys itself when the
//! host pumps [`crate::Engine::run_microtasks`], [`crate::Engine::run_frame`],
//! and [`crate::Engine::run_timers`].

use smallvec::SmallVec;

use wayfind_score::DirName;

/// Coalescing key of a pending task.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TaskKey {
    /// Flush the buffered mutation records.
    MutationFlush,
    /// Recompute and publish the focus overlay.
    Overlay,
    /// Sentinel-triggered full refresh.
    VirtualScroll,
    /// Clear a dead-direction mark.
    HintDecay(DirName),
}

/// When a pending task runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskClass {
    /// When the host's current task unwinds.
    Microtask,
    /// On the next animation frame.
    Frame,
    /// When `now_ms` reaches the deadline.
    Timer(u64),
}

#[derive(Copy, Clone, Debug)]
struct Task {
    key: TaskKey,
    class: TaskClass,
    seq: u64,
}

/// Deadline-and-class task queue with per-key coalescing.
#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: SmallVec<[Task; 8]>,
    seq: u64,
}

impl Scheduler {
    /// An empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule (or replace) the task under `key`.
    pub fn schedule(&mut self, key: TaskKey, class: TaskClass) {
        self.tasks.retain(|t| t.key != key);
        self.seq += 1;
        self.tasks.push(Task {
            key,
            class,
            seq: self.seq,
        });
    }

    /// Drop the pending task under `key`. Returns whether one existed.
    pub fn cancel(&mut self, key: TaskKey) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.key != key);
        self.tasks.len() != before
    }

    /// Whether a task is pending under `key`.
    #[must_use]
    pub fn is_pending(&self, key: TaskKey) -> bool {
        self.tasks.iter().any(|t| t.key == key)
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Whether any task is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The earliest pending timer deadline, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.tasks
            .iter()
            .filter_map(|t| match t.class {
                TaskClass::Timer(deadline) => Some(deadline),
                _ => None,
            })
            .min()
    }

    /// Remove and return all pending microtasks, in scheduling order.
    pub fn take_microtasks(&mut self) -> SmallVec<[TaskKey; 4]> {
        self.take_class(|class| matches!(class, TaskClass::Microtask))
    }

    /// Remove and return all pending frame tasks, in scheduling order.
    pub fn take_frame_tasks(&mut self) -> SmallVec<[TaskKey; 4]> {
        self.take_class(|class| matches!(class, TaskClass::Frame))
    }

    /// Remove and return the timers due at `now_ms`, earliest deadline
    /// first (scheduling order within a deadline).
    pub fn take_due_timers(&mut self, now_ms: u64) -> SmallVec<[TaskKey; 4]> {
        let mut due: SmallVec<[Task; 4]> = SmallVec::new();
        self.tasks.retain(|t| match t.class {
            TaskClass::Timer(deadline) if deadline <= now_ms => {
                due.push(*t);
                false
            }
            _ => true,
        });
        due.sort_by_key(|t| {
            let TaskClass::Timer(deadline) = t.class else {
                unreachable!("only timers are collected above");
            };
            (deadline, t.seq)
        });
        due.into_iter().map(|t| t.key).collect()
    }

    fn take_class(&mut self, matches: impl Fn(TaskClass) -> bool) -> SmallVec<[TaskKey; 4]> {
        let mut taken: SmallVec<[Task; 4]> = SmallVec::new();
        self.tasks.retain(|t| {
            if matches(t.class) {
                taken.push(*t);
                false
            } else {
                true
            }
        });
        taken.sort_by_key(|t| t.seq);
        taken.into_iter().map(|t| t.key).collect()
    }
}
