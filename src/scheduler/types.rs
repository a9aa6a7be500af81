/*!
 * Scheduler Types
 * Per-task control blocks and spawn handles
 */

use crate::core::data_structures::InlineString;
use crate::core::types::{Priority, TaskId};
use parking_lot::Condvar;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread::JoinHandle;

/// Control block of a task backed by an OS thread
#[derive(Debug)]
pub struct TaskControl {
    pub(super) id: TaskId,
    pub(super) name: InlineString,
    pub(super) priority: AtomicU8,
    /// Set by `resume_task`, cleared when the task suspends
    pub(super) resumed: AtomicBool,
    pub(super) wakeup: Condvar,
}

impl TaskControl {
    pub(super) fn new(id: TaskId, name: InlineString, priority: Priority) -> Self {
        Self {
            id,
            name,
            priority: AtomicU8::new(priority),
            resumed: AtomicBool::new(false),
            wakeup: Condvar::new(),
        }
    }

    #[inline]
    pub fn priority(&self) -> Priority {
        self.priority.load(Ordering::Acquire)
    }

    pub fn info(&self) -> TaskInfo {
        TaskInfo {
            id: self.id,
            name: self.name.clone(),
            priority: self.priority(),
        }
    }
}

/// Snapshot of a registered task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub id: TaskId,
    pub name: InlineString,
    pub priority: Priority,
}

/// Handle to a spawned task
#[derive(Debug)]
pub struct TaskHandle<R> {
    pub(super) id: TaskId,
    pub(super) join: JoinHandle<R>,
}

impl<R> TaskHandle<R> {
    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Wait for the task to finish and return its result
    pub fn join(self) -> std::thread::Result<R> {
        self.join.join()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
