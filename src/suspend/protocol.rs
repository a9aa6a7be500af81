/*!
 * Block / Wake Protocol
 *
 * The sequence every object runs when a request cannot complete at once:
 * link a record, hand the kernel lock to the scheduler, and on resumption
 * either read the completion or, if nothing completed it, run the
 * object's cleanup to unlink the record and report a timeout. The kernel
 * lock serializes cleanup against wake, so only one of them ever sees
 * the record linked.
 */

use super::record::{Completion, WaitStatus};
use crate::core::types::{Priority, Suspend, SuspendReason, TaskId};
use crate::kernel::{KernelGuard, KernelState};
use crate::monitoring::WaitSpan;
use crate::scheduler::Scheduler;
use std::time::Duration;

/// Caller that is allowed to block
///
/// Objects resolve this after validating their handle and arguments, so a
/// bad handle is reported ahead of a bad suspension request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blocking {
    pub task: TaskId,
    pub priority: Priority,
    pub timeout: Option<Duration>,
}

/// Suspension was requested from a context that cannot block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotBlockable;

/// Decide whether the current caller may block for this request
///
/// `Ok(None)` means the caller asked not to block.
pub fn resolve(
    scheduler: &dyn Scheduler,
    suspend: Suspend,
) -> Result<Option<Blocking>, NotBlockable> {
    if !suspend.may_block() {
        return Ok(None);
    }
    let task = scheduler.current_task().ok_or(NotBlockable)?;
    Ok(Some(Blocking {
        task,
        priority: scheduler.task_priority(task),
        timeout: suspend.timeout(),
    }))
}

/// Block the calling task until its record is completed or times out
///
/// The record must already be linked. `cleanup` runs with the lock held
/// only when no wake path completed the record.
pub fn block_on<T>(
    scheduler: &dyn Scheduler,
    guard: &mut KernelGuard<'_>,
    blocking: Blocking,
    reason: SuspendReason,
    completion: &Completion<T>,
    cleanup: impl FnOnce(&mut KernelState),
) -> WaitStatus<T> {
    let span = WaitSpan::new(blocking.task, reason, blocking.timeout);
    scheduler.suspend_task(guard, blocking.task, reason, blocking.timeout);

    let status = match completion.take() {
        Some(status) => status,
        None => {
            cleanup(&mut **guard);
            WaitStatus::Timeout
        }
    };
    span.record_outcome(status.label());
    status
}

/// Yield once after a sweep of wakes if any of them asked for it
///
/// Must be called after the kernel lock is released.
#[inline]
pub fn yield_if_preempted(scheduler: &dyn Scheduler, preempt: bool) {
    if preempt {
        scheduler.relinquish();
    }
}
