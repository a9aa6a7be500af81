/*!
 * Scheduler Traits
 * Interface the kernel objects need from the task scheduler
 */

use crate::core::types::{Priority, SuspendReason, TaskId};
use crate::kernel::KernelGuard;
use std::time::Duration;

/// Scheduler collaborator
///
/// The kernel objects never pick tasks to run; they only ask the
/// scheduler who is calling, park that caller, and make parked tasks
/// ready again.
pub trait Scheduler: Send + Sync {
    /// Task making the current call, or None from a context that cannot block
    fn current_task(&self) -> Option<TaskId>;

    /// Current priority of a task (0 is the most urgent)
    fn task_priority(&self, task: TaskId) -> Priority;

    /// Park `task` until it is resumed or `timeout` elapses
    ///
    /// The kernel lock is released atomically with blocking and held again
    /// when this returns.
    fn suspend_task(
        &self,
        guard: &mut KernelGuard<'_>,
        task: TaskId,
        reason: SuspendReason,
        timeout: Option<Duration>,
    );

    /// Make a suspended task ready; true if it should preempt the caller
    ///
    /// Called with the kernel lock held.
    fn resume_task(&self, task: TaskId, reason: SuspendReason) -> bool;

    /// Hand the processor back after a wake that signalled preemption
    fn relinquish(&self);
}
