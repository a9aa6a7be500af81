/*!
 * Partition Pools
 * Fixed-size block allocator: no splitting, no merging, O(1) both ways
 */

mod manager;
mod pool;
mod types;

pub use manager::PartitionManager;
pub use pool::PartitionPool;
pub use types::{PartitionError, PartitionHandle, PartitionInfo, PartitionResult};
