/*!
 * Partition Pool Manager
 * O(1) fixed-size allocation with suspension when the pool runs dry
 */

use super::pool::PartitionPool;
use super::types::{PartitionError, PartitionHandle, PartitionInfo, PartitionResult};
use crate::core::limits::{round_to_word, PM_OVERHEAD, WORD_SIZE};
use crate::core::types::{Address, MemoryRegion, Size, Suspend, SuspendPolicy, SuspendReason};
use crate::kernel::Kernel;
use crate::suspend::{self, WaitStatus, Waiter};
use log::{debug, info, warn};

/// Partition pool operations
#[derive(Clone)]
pub struct PartitionManager {
    kernel: Kernel,
}

impl PartitionManager {
    pub(crate) fn new(kernel: Kernel) -> Self {
        Self { kernel }
    }

    /// Create a pool of `partition_size`-byte partitions over `region`
    pub fn create(
        &self,
        name: &str,
        region: MemoryRegion,
        partition_size: Size,
        policy: SuspendPolicy,
    ) -> PartitionResult<PartitionHandle> {
        if region.start == 0 || region.start.checked_add(region.size).is_none() {
            return Err(PartitionError::InvalidMemory);
        }
        if region.start % WORD_SIZE != 0 {
            return Err(PartitionError::NotAligned);
        }
        let Some(partition_size) = round_to_word(partition_size) else {
            return Err(PartitionError::InvalidSize);
        };
        let fits = partition_size
            .checked_add(PM_OVERHEAD)
            .is_some_and(|stride| stride <= region.size);
        if partition_size == 0 || !fits {
            return Err(PartitionError::InvalidSize);
        }

        let name = self.kernel.object_name(name);
        let pool = PartitionPool::new(name.clone(), region, partition_size, policy);
        let count = pool.total();

        let handle = self.kernel.lock().partitions.insert(pool);
        info!(
            "Partition pool '{}' created at 0x{:x}: {} partitions of {} bytes, {} suspension",
            name, region.start, count, partition_size, policy
        );
        Ok(handle)
    }

    /// Take one partition
    pub fn allocate(&self, handle: PartitionHandle, suspend: Suspend) -> PartitionResult<Address> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let wait_id = state.next_wait_id();
        let pool = state
            .partitions
            .get_mut(handle)
            .ok_or(PartitionError::InvalidPool)?;
        let blocking =
            suspend::resolve(scheduler, suspend).map_err(|_| PartitionError::InvalidSuspend)?;

        if let Some(address) = pool.pop() {
            debug!("Partition 0x{:x} allocated from '{}'", address, pool.name);
            return Ok(address);
        }

        let Some(blocking) = blocking else {
            return Err(PartitionError::NoPartition);
        };

        let (waiter, completion) = Waiter::new(wait_id, blocking.task, blocking.priority, ());
        pool.waiters.link(waiter);
        debug!("Task {} waiting for a partition from '{}'", blocking.task, pool.name);

        let status = suspend::block_on(
            scheduler,
            &mut state,
            blocking,
            SuspendReason::Partition,
            &completion,
            |state| {
                let unlinked = state
                    .partitions
                    .get_mut(handle)
                    .and_then(|pool| pool.waiters.unlink(wait_id));
                debug_assert!(unlinked.is_some(), "timed-out partition request was not linked");
            },
        );
        drop(state);

        PartitionError::from_wait(status)
    }

    /// Give a partition back
    ///
    /// If a task is waiting the partition goes straight to it and never
    /// touches the free stack.
    pub fn deallocate(&self, address: Address) -> PartitionResult<()> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();

        let owner = state
            .partitions
            .iter()
            .find(|(_, pool)| pool.is_allocated(address))
            .map(|(handle, _)| handle);
        let Some(pool) = owner.and_then(|handle| state.partitions.get_mut(handle)) else {
            warn!("Deallocate of unknown partition 0x{:x}", address);
            return Err(PartitionError::InvalidPointer(address));
        };

        let preempt = match pool.waiters.pop_front() {
            Some(waiter) => {
                debug!("Partition 0x{:x} handed to task {}", address, waiter.task);
                pool.waiters.wake(scheduler, waiter, WaitStatus::Satisfied(address))
            }
            None => {
                pool.push(address);
                false
            }
        };
        drop(state);

        suspend::yield_if_preempted(scheduler, preempt);
        Ok(())
    }

    /// Delete a pool, failing every suspended request with `PoolDeleted`
    pub fn delete(&self, handle: PartitionHandle) -> PartitionResult<MemoryRegion> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let mut pool = state
            .partitions
            .remove(handle)
            .ok_or(PartitionError::InvalidPool)?;

        let waiting = pool.waiters.len();
        let preempt = pool.waiters.force_wake_all(scheduler, || WaitStatus::Deleted);
        drop(state);

        info!("Partition pool '{}' deleted ({} waiters released)", pool.name, waiting);
        suspend::yield_if_preempted(scheduler, preempt);
        Ok(pool.region)
    }

    pub fn information(&self, handle: PartitionHandle) -> PartitionResult<PartitionInfo> {
        let state = self.kernel.lock();
        state
            .partitions
            .get(handle)
            .map(PartitionPool::info)
            .ok_or(PartitionError::InvalidPool)
    }

    /// Free partitions in the order they will be handed out
    pub fn free_partitions(&self, handle: PartitionHandle) -> PartitionResult<Vec<Address>> {
        let state = self.kernel.lock();
        state
            .partitions
            .get(handle)
            .map(PartitionPool::free_stack)
            .ok_or(PartitionError::InvalidPool)
    }

    /// Up to `max` live partition pools, oldest first
    pub fn pool_handles(&self, max: usize) -> Vec<PartitionHandle> {
        self.kernel.lock().partitions.handles(max)
    }

    /// Number of live partition pools
    pub fn established(&self) -> usize {
        self.kernel.lock().partitions.len()
    }
}
