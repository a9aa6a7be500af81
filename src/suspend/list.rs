/*!
 * Suspension List
 *
 * Ordered set of records blocked on one object. The list length is the
 * object's `tasks_waiting`, so the count can never drift from the links.
 */

use super::record::{WaitId, WaitStatus, Waiter};
use crate::core::types::{Priority, SuspendPolicy, SuspendReason, TaskId};
use crate::scheduler::Scheduler;
use std::collections::VecDeque;

/// Records blocked on one object, in wake order
#[derive(Debug)]
pub struct SuspensionList<R, T> {
    policy: SuspendPolicy,
    reason: SuspendReason,
    waiters: VecDeque<Waiter<R, T>>,
}

impl<R, T> SuspensionList<R, T> {
    pub fn new(policy: SuspendPolicy, reason: SuspendReason) -> Self {
        Self {
            policy,
            reason,
            waiters: VecDeque::new(),
        }
    }

    #[inline]
    pub fn policy(&self) -> SuspendPolicy {
        self.policy
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }

    /// Task that would be woken first
    pub fn first_task(&self) -> Option<TaskId> {
        self.waiters.front().map(|w| w.task)
    }

    pub fn front(&self) -> Option<&Waiter<R, T>> {
        self.waiters.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waiter<R, T>> + '_ {
        self.waiters.iter()
    }

    /// Link a record according to the list's policy
    ///
    /// Under priority ordering the record goes in front of the first
    /// entry that is strictly less urgent, behind every equal one.
    pub fn link(&mut self, waiter: Waiter<R, T>) {
        match self.policy {
            SuspendPolicy::Fifo => self.waiters.push_back(waiter),
            SuspendPolicy::Priority => {
                let at = self.insertion_point(waiter.priority);
                self.waiters.insert(at, waiter);
            }
        }
    }

    /// Link a record at the tail regardless of policy
    pub fn push_back(&mut self, waiter: Waiter<R, T>) {
        self.waiters.push_back(waiter);
    }

    fn insertion_point(&self, priority: Priority) -> usize {
        self.waiters
            .iter()
            .position(|w| w.priority > priority)
            .unwrap_or(self.waiters.len())
    }

    /// Unlink the head record
    pub fn pop_front(&mut self) -> Option<Waiter<R, T>> {
        self.waiters.pop_front()
    }

    /// Unlink a specific record; None if another path already did
    pub fn unlink(&mut self, id: WaitId) -> Option<Waiter<R, T>> {
        let at = self.waiters.iter().position(|w| w.id == id)?;
        self.waiters.remove(at)
    }

    /// Unlink every record matching `pred`, preserving list order
    pub fn unlink_where(
        &mut self,
        mut pred: impl FnMut(&Waiter<R, T>) -> bool,
    ) -> Vec<Waiter<R, T>> {
        let mut taken = Vec::new();
        let mut kept = VecDeque::with_capacity(self.waiters.len());
        for waiter in self.waiters.drain(..) {
            if pred(&waiter) {
                taken.push(waiter);
            } else {
                kept.push_back(waiter);
            }
        }
        self.waiters = kept;
        taken
    }

    /// Complete an already unlinked record and resume its task
    ///
    /// Returns true when the scheduler reports a pending preemption.
    pub fn wake(
        &self,
        scheduler: &dyn Scheduler,
        waiter: Waiter<R, T>,
        status: WaitStatus<T>,
    ) -> bool {
        let task = waiter.complete(status);
        scheduler.resume_task(task, self.reason)
    }

    /// Wake every record with a terminal status, in list order
    pub fn force_wake_all(
        &mut self,
        scheduler: &dyn Scheduler,
        status: impl Fn() -> WaitStatus<T>,
    ) -> bool {
        let mut preempt = false;
        while let Some(waiter) = self.waiters.pop_front() {
            preempt |= self.wake(scheduler, waiter, status());
        }
        preempt
    }
}
