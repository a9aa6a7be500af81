/*!
 * Suspend Records
 *
 * A record describes one blocked call. The object links the record into
 * its suspension list; the blocked caller keeps the shared completion
 * slot and reads the outcome from it once the scheduler resumes it.
 */

use crate::core::types::{Priority, TaskId};
use parking_lot::Mutex;
use std::sync::Arc;

/// Kernel-wide identity of one suspension
pub type WaitId = u64;

/// Outcome written into a record by whichever path unblocks it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitStatus<T> {
    /// The request was satisfied; carries the return payload
    Satisfied(T),
    /// The bounded suspension ran out
    Timeout,
    /// The object was deleted while the caller was blocked
    Deleted,
    /// The object was reset while the caller was blocked
    Reset,
}

impl<T> WaitStatus<T> {
    pub fn label(&self) -> &'static str {
        match self {
            WaitStatus::Satisfied(_) => "satisfied",
            WaitStatus::Timeout => "timeout",
            WaitStatus::Deleted => "deleted",
            WaitStatus::Reset => "reset",
        }
    }
}

/// Single-shot slot shared between a record and its blocked caller
#[derive(Debug)]
pub struct Completion<T> {
    slot: Mutex<Option<WaitStatus<T>>>,
}

impl<T> Completion<T> {
    fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    fn fill(&self, status: WaitStatus<T>) {
        let mut slot = self.slot.lock();
        debug_assert!(slot.is_none(), "suspend record completed twice");
        *slot = Some(status);
    }

    /// Take the outcome, if any path has written one
    pub fn take(&self) -> Option<WaitStatus<T>> {
        self.slot.lock().take()
    }
}

/// A blocked call linked into an object's suspension list
///
/// `R` is the type-specific request payload, `T` the payload handed back
/// on success.
#[derive(Debug)]
pub struct Waiter<R, T> {
    pub id: WaitId,
    pub task: TaskId,
    pub priority: Priority,
    pub request: R,
    completion: Arc<Completion<T>>,
}

impl<R, T> Waiter<R, T> {
    /// Build a record and the completion slot its caller will wait on
    pub fn new(
        id: WaitId,
        task: TaskId,
        priority: Priority,
        request: R,
    ) -> (Self, Arc<Completion<T>>) {
        let completion = Arc::new(Completion::new());
        let waiter = Self {
            id,
            task,
            priority,
            request,
            completion: Arc::clone(&completion),
        };
        (waiter, completion)
    }

    /// Write the outcome; the caller resumes the task separately
    pub(crate) fn complete(self, status: WaitStatus<T>) -> TaskId {
        self.completion.fill(status);
        self.task
    }
}
