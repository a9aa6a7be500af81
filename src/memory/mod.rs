/*!
 * Dynamic Memory Pools
 *
 * Variable-size allocator over a caller-described address range.
 *
 * ## Layout
 *
 * - One header per block, `DM_OVERHEAD` bytes accounted in front of each
 *   payload
 * - Blocks threaded in address order (used for merging) and free blocks
 *   threaded separately (used for searching)
 * - A trailer block that is never free terminates the address ring
 *
 * ## Allocation
 *
 * - First fit from a rotating search pointer
 * - Alignment by front split, leaving the misaligned prefix free
 * - Rear split when the residue can hold a header plus `min_allocation`
 *
 * ## Accounting
 *
 * Live payload plus `available` plus one overhead per header always equals
 * the pool size.
 */

mod allocator;
mod deallocator;
mod manager;
mod pool;
mod types;

pub use manager::MemoryPoolManager;
pub use pool::MemoryPool;
pub use types::{BlockSpan, PoolError, PoolHandle, PoolInfo, PoolResult};
