/*!
 * Memory Pool Types
 * Errors, handles and snapshots for dynamic memory pools
 */

use super::pool::MemoryPool;
use crate::core::data_structures::InlineString;
use crate::core::id::Handle;
use crate::core::types::{Address, Size, SuspendPolicy, TaskId};
use crate::suspend::WaitStatus;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Handle to a dynamic memory pool
pub type PoolHandle = Handle<MemoryPool>;

/// Memory pool operation result
pub type PoolResult<T> = Result<T, PoolError>;

/// Dynamic memory pool errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum PoolError {
    #[error("Invalid memory pool")]
    #[diagnostic(
        code(memory::invalid_pool),
        help("The pool handle is stale or the pool was never created.")
    )]
    InvalidPool,

    #[error("Invalid memory region start")]
    #[diagnostic(
        code(memory::invalid_memory),
        help("Supply a non-null region start address.")
    )]
    InvalidMemory,

    #[error("Memory region is not word aligned")]
    #[diagnostic(
        code(memory::not_aligned),
        help("Region start must be a multiple of the machine word.")
    )]
    NotAligned,

    #[error("Address 0x{0:x} is not a live allocation")]
    #[diagnostic(
        code(memory::invalid_pointer),
        help("Only addresses returned by allocate may be deallocated, and only once.")
    )]
    InvalidPointer(Address),

    #[error("Invalid size")]
    #[diagnostic(
        code(memory::invalid_size),
        help("Size must be non-zero and fit the pool (pool size minus two block headers).")
    )]
    InvalidSize,

    #[error("Invalid suspension request")]
    #[diagnostic(
        code(memory::invalid_suspend),
        help("Only tasks may suspend; use Suspend::NoSuspend from other contexts.")
    )]
    InvalidSuspend,

    #[error("No memory available")]
    #[diagnostic(
        code(memory::no_memory),
        help("The pool is exhausted. Retry later or suspend until memory is freed.")
    )]
    NoMemory,

    #[error("Timed out waiting for memory")]
    #[diagnostic(code(memory::timeout))]
    Timeout,

    #[error("Memory pool deleted while waiting")]
    #[diagnostic(code(memory::pool_deleted))]
    PoolDeleted,
}

impl PoolError {
    /// Map the outcome of a suspended allocation
    pub(crate) fn from_wait(status: WaitStatus<Address>) -> PoolResult<Address> {
        match status {
            WaitStatus::Satisfied(address) => Ok(address),
            WaitStatus::Timeout => Err(PoolError::Timeout),
            WaitStatus::Deleted | WaitStatus::Reset => Err(PoolError::PoolDeleted),
        }
    }
}

/// Pending allocation of a suspended caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AllocRequest {
    pub size: Size,
    pub alignment: Size,
}

/// Snapshot of a memory pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub name: InlineString,
    pub start: Address,
    pub pool_size: Size,
    pub min_allocation: Size,
    pub available: Size,
    pub suspend_policy: SuspendPolicy,
    pub tasks_waiting: usize,
    pub first_task: Option<TaskId>,
}

/// One block of a pool in address order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSpan {
    /// First usable byte of the block
    pub address: Address,
    /// Usable bytes, excluding the header
    pub size: Size,
    pub free: bool,
}
