/*!
 * Partition Pool Types
 */

use super::pool::PartitionPool;
use crate::core::data_structures::InlineString;
use crate::core::id::Handle;
use crate::core::types::{Address, Size, SuspendPolicy, TaskId};
use crate::suspend::WaitStatus;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Handle to a partition pool
pub type PartitionHandle = Handle<PartitionPool>;

/// Partition pool operation result
pub type PartitionResult<T> = Result<T, PartitionError>;

/// Partition pool errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum PartitionError {
    #[error("Invalid partition pool")]
    #[diagnostic(
        code(partition::invalid_pool),
        help("The pool handle is stale or the pool was never created.")
    )]
    InvalidPool,

    #[error("Invalid memory region start")]
    #[diagnostic(code(partition::invalid_memory), help("Supply a non-null region start address."))]
    InvalidMemory,

    #[error("Memory region is not word aligned")]
    #[diagnostic(
        code(partition::not_aligned),
        help("Region start must be a multiple of the machine word.")
    )]
    NotAligned,

    #[error("Address 0x{0:x} is not an allocated partition")]
    #[diagnostic(
        code(partition::invalid_pointer),
        help("Only addresses returned by allocate may be deallocated, and only once.")
    )]
    InvalidPointer(Address),

    #[error("Invalid size")]
    #[diagnostic(
        code(partition::invalid_size),
        help("The region must hold at least one partition plus its header.")
    )]
    InvalidSize,

    #[error("Invalid suspension request")]
    #[diagnostic(
        code(partition::invalid_suspend),
        help("Only tasks may suspend; use Suspend::NoSuspend from other contexts.")
    )]
    InvalidSuspend,

    #[error("No partition available")]
    #[diagnostic(
        code(partition::no_partition),
        help("Retry later or suspend until a partition is freed.")
    )]
    NoPartition,

    #[error("Timed out waiting for a partition")]
    #[diagnostic(code(partition::timeout))]
    Timeout,

    #[error("Partition pool deleted while waiting")]
    #[diagnostic(code(partition::pool_deleted))]
    PoolDeleted,
}

impl PartitionError {
    pub(crate) fn from_wait(status: WaitStatus<Address>) -> PartitionResult<Address> {
        match status {
            WaitStatus::Satisfied(address) => Ok(address),
            WaitStatus::Timeout => Err(PartitionError::Timeout),
            WaitStatus::Deleted | WaitStatus::Reset => Err(PartitionError::PoolDeleted),
        }
    }
}

/// Snapshot of a partition pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionInfo {
    pub name: InlineString,
    pub start: Address,
    pub pool_size: Size,
    pub partition_size: Size,
    pub available: usize,
    pub allocated: usize,
    pub suspend_policy: SuspendPolicy,
    pub tasks_waiting: usize,
    pub first_task: Option<TaskId>,
}
