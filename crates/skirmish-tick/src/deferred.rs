//! Deferred tasks: work that must run a fixed number of ticks from now.
//!
//! A task is a plain value (`T`), not a closure. The authority decides
//! what to do with it when it comes due, which keeps every mutation on the
//! authority and makes pending work inspectable and cancellable.
//!
//! Each task has an owner (`K`, typically a match id). When the owner is
//! torn down, [`DeferredTasks::cancel_owner`] drops everything it still
//! has pending.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::trace;

/// Identifies one scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

/// A task whose due tick has arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct DueTask<K, T> {
    pub id: TaskId,
    pub owner: K,
    pub task: T,
    pub due_tick: u64,
}

struct Scheduled<K, T> {
    owner: K,
    task: T,
}

/// Tick-indexed queue of deferred tasks.
///
/// Ordering: tasks come due in `(due_tick, submission order)` order, so two
/// tasks scheduled for the same tick run in the order they were scheduled.
pub struct DeferredTasks<K, T> {
    now: u64,
    next_id: u64,
    /// Keyed by `(due_tick, id)`; the BTreeMap keeps them sorted.
    queue: BTreeMap<(u64, TaskId), Scheduled<K, T>>,
    /// Reverse index for [`cancel`](Self::cancel).
    due_ticks: HashMap<TaskId, u64>,
}

impl<K: PartialEq, T> DeferredTasks<K, T> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_id: 1,
            queue: BTreeMap::new(),
            due_ticks: HashMap::new(),
        }
    }

    /// The current tick as seen by this queue.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedules `task` to come due `delay_ticks` ticks from now.
    ///
    /// A delay of 0 is treated as 1: a task never runs in the tick that
    /// scheduled it.
    pub fn schedule(&mut self, owner: K, delay_ticks: u64, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let due = self.now + delay_ticks.max(1);
        self.queue.insert((due, id), Scheduled { owner, task });
        self.due_ticks.insert(id, due);
        trace!(task_id = %id, due_tick = due, "deferred task scheduled");
        id
    }

    /// Moves the clock forward one tick and returns every task now due.
    pub fn advance(&mut self) -> Vec<DueTask<K, T>> {
        self.now += 1;
        let mut due = Vec::new();
        while let Some(entry) = self.queue.first_entry() {
            let (due_tick, id) = *entry.key();
            if due_tick > self.now {
                break;
            }
            let scheduled = entry.remove();
            self.due_ticks.remove(&id);
            due.push(DueTask {
                id,
                owner: scheduled.owner,
                task: scheduled.task,
                due_tick,
            });
        }
        due
    }

    /// Cancels a single task. Returns `false` if it already ran or was
    /// cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        match self.due_ticks.remove(&id) {
            Some(due) => self.queue.remove(&(due, id)).is_some(),
            None => false,
        }
    }

    /// Cancels every pending task owned by `owner`. Returns how many were
    /// dropped.
    pub fn cancel_owner(&mut self, owner: &K) -> usize {
        let before = self.queue.len();
        let due_ticks = &mut self.due_ticks;
        self.queue.retain(|(_, id), scheduled| {
            if scheduled.owner == *owner {
                due_ticks.remove(id);
                false
            } else {
                true
            }
        });
        before - self.queue.len()
    }

    /// Number of pending tasks owned by `owner`.
    pub fn pending_for(&self, owner: &K) -> usize {
        self.queue.values().filter(|s| s.owner == *owner).count()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<K: PartialEq, T> Default for DeferredTasks<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
