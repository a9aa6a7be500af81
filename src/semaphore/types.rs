/*!
 * Semaphore Types
 */

use super::manager::Semaphore;
use crate::core::data_structures::InlineString;
use crate::core::id::Handle;
use crate::core::types::{SuspendPolicy, TaskId};
use crate::suspend::WaitStatus;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Handle to a counting semaphore
pub type SemaphoreHandle = Handle<Semaphore>;

/// Semaphore operation result
pub type SemaphoreResult<T> = Result<T, SemaphoreError>;

/// Counting semaphore errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SemaphoreError {
    #[error("Invalid semaphore")]
    #[diagnostic(
        code(semaphore::invalid_semaphore),
        help("The semaphore handle is stale or the semaphore was never created.")
    )]
    InvalidSemaphore,

    #[error("Invalid suspension request")]
    #[diagnostic(
        code(semaphore::invalid_suspend),
        help("Only tasks may suspend; use Suspend::NoSuspend from other contexts.")
    )]
    InvalidSuspend,

    #[error("Semaphore unavailable")]
    #[diagnostic(
        code(semaphore::unavailable),
        help("Retry later or suspend until it is released.")
    )]
    Unavailable,

    #[error("Semaphore count would overflow")]
    #[diagnostic(
        code(semaphore::count_rollover),
        help("Every release must match an earlier obtain or the initial count.")
    )]
    CountRollover,

    #[error("Timed out waiting for semaphore")]
    #[diagnostic(code(semaphore::timeout))]
    Timeout,

    #[error("Semaphore deleted while waiting")]
    #[diagnostic(code(semaphore::deleted))]
    SemaphoreDeleted,

    #[error("Semaphore reset while waiting")]
    #[diagnostic(code(semaphore::reset))]
    SemaphoreReset,
}

impl SemaphoreError {
    pub(crate) fn from_wait(status: WaitStatus<()>) -> SemaphoreResult<()> {
        match status {
            WaitStatus::Satisfied(()) => Ok(()),
            WaitStatus::Timeout => Err(SemaphoreError::Timeout),
            WaitStatus::Deleted => Err(SemaphoreError::SemaphoreDeleted),
            WaitStatus::Reset => Err(SemaphoreError::SemaphoreReset),
        }
    }
}

/// Snapshot of a semaphore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemaphoreInfo {
    pub name: InlineString,
    pub current_count: u32,
    pub suspend_policy: SuspendPolicy,
    pub tasks_waiting: usize,
    pub first_task: Option<TaskId>,
}
