/*!
 * Memory Pool Manager
 * Create, allocate, deallocate, delete and query dynamic memory pools
 */

use super::pool::MemoryPool;
use super::types::{AllocRequest, BlockSpan, PoolError, PoolHandle, PoolInfo, PoolResult};
use crate::core::limits::{round_to_word, DM_OVERHEAD, WORD_SIZE};
use crate::core::types::{Address, MemoryRegion, Size, Suspend, SuspendPolicy, SuspendReason};
use crate::kernel::Kernel;
use crate::suspend::{self, WaitStatus, Waiter};
use log::{debug, info, warn};

/// Dynamic memory pool operations
#[derive(Clone)]
pub struct MemoryPoolManager {
    kernel: Kernel,
}

impl MemoryPoolManager {
    pub(crate) fn new(kernel: Kernel) -> Self {
        Self { kernel }
    }

    /// Create a pool over `region`
    ///
    /// `min_allocation` is rounded up and the region size rounded down to
    /// whole words.
    pub fn create(
        &self,
        name: &str,
        region: MemoryRegion,
        min_allocation: Size,
        policy: SuspendPolicy,
    ) -> PoolResult<PoolHandle> {
        if region.start == 0 || region.start.checked_add(region.size).is_none() {
            return Err(PoolError::InvalidMemory);
        }
        if region.start % WORD_SIZE != 0 {
            return Err(PoolError::NotAligned);
        }

        let region = MemoryRegion::new(region.start, region.size - region.size % WORD_SIZE);
        let Some(min_allocation) = round_to_word(min_allocation) else {
            return Err(PoolError::InvalidSize);
        };
        let fits = min_allocation
            .checked_add(2 * DM_OVERHEAD)
            .is_some_and(|needed| needed <= region.size);
        if min_allocation == 0 || !fits {
            return Err(PoolError::InvalidSize);
        }

        let name = self.kernel.object_name(name);
        let pool = MemoryPool::new(name.clone(), region, min_allocation, policy);
        let available = pool.available;

        let handle = self.kernel.lock().pools.insert(pool);
        info!(
            "Memory pool '{}' created at 0x{:x}: {} bytes, {} available, \
             min allocation {}, {} suspension",
            name, region.start, region.size, available, min_allocation, policy
        );
        Ok(handle)
    }

    /// Allocate `size` bytes with no alignment requirement
    pub fn allocate(
        &self,
        handle: PoolHandle,
        size: Size,
        suspend: Suspend,
    ) -> PoolResult<Address> {
        self.allocate_aligned(handle, size, 0, suspend)
    }

    /// Allocate `size` bytes whose address is a multiple of `alignment`
    ///
    /// An `alignment` of 0 means none; other values are rounded up to
    /// whole words.
    pub fn allocate_aligned(
        &self,
        handle: PoolHandle,
        size: Size,
        alignment: Size,
        suspend: Suspend,
    ) -> PoolResult<Address> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let wait_id = state.next_wait_id();
        let pool = state.pools.get_mut(handle).ok_or(PoolError::InvalidPool)?;

        if size == 0 || size > pool.capacity() {
            return Err(PoolError::InvalidSize);
        }
        let (Some(size), Some(alignment)) = (round_to_word(size), round_to_word(alignment)) else {
            warn!("Rejected alignment {} for pool '{}'", alignment, pool.name);
            return Err(PoolError::InvalidSize);
        };
        let size = size.max(pool.min_allocation);
        let blocking =
            suspend::resolve(scheduler, suspend).map_err(|_| PoolError::InvalidSuspend)?;

        if let Some(address) = pool.carve(size, alignment) {
            debug!(
                "Allocated {} bytes at 0x{:x} from pool '{}' ({} available)",
                size, address, pool.name, pool.available
            );
            return Ok(address);
        }

        let Some(blocking) = blocking else {
            return Err(PoolError::NoMemory);
        };

        let (waiter, completion) = Waiter::new(
            wait_id,
            blocking.task,
            blocking.priority,
            AllocRequest { size, alignment },
        );
        pool.waiters.link(waiter);
        debug!(
            "Task {} waiting for {} bytes from pool '{}'",
            blocking.task, size, pool.name
        );

        let status = suspend::block_on(
            scheduler,
            &mut state,
            blocking,
            SuspendReason::MemoryPool,
            &completion,
            |state| {
                let unlinked = state
                    .pools
                    .get_mut(handle)
                    .and_then(|pool| pool.waiters.unlink(wait_id));
                debug_assert!(unlinked.is_some(), "timed-out allocation was not linked");
            },
        );
        drop(state);

        PoolError::from_wait(status)
    }

    /// Return an allocation to the pool it came from
    ///
    /// Suspended allocations are then served from the head of the
    /// suspension list for as long as they fit.
    pub fn deallocate(&self, address: Address) -> PoolResult<()> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();

        let owner = state
            .pools
            .iter()
            .find(|(_, pool)| pool.region.contains(address) && pool.live_block(address).is_some())
            .map(|(handle, _)| handle);
        let Some(pool) = owner.and_then(|handle| state.pools.get_mut(handle)) else {
            warn!("Deallocate of unknown address 0x{:x}", address);
            return Err(PoolError::InvalidPointer(address));
        };

        pool.release(address)?;
        debug!(
            "Released 0x{:x} to pool '{}' ({} available)",
            address, pool.name, pool.available
        );

        let mut preempt = false;
        while let Some(request) = pool.waiters.front().map(|waiter| waiter.request) {
            let Some(granted) = pool.carve(request.size, request.alignment) else {
                break;
            };
            if let Some(waiter) = pool.waiters.pop_front() {
                debug!("Granted {} bytes at 0x{:x} to task {}", request.size, granted, waiter.task);
                preempt |= pool.waiters.wake(scheduler, waiter, WaitStatus::Satisfied(granted));
            }
        }
        drop(state);

        suspend::yield_if_preempted(scheduler, preempt);
        Ok(())
    }

    /// Delete a pool, failing every suspended allocation with `PoolDeleted`
    ///
    /// Returns the region so the caller can reuse it.
    pub fn delete(&self, handle: PoolHandle) -> PoolResult<MemoryRegion> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let mut pool = state.pools.remove(handle).ok_or(PoolError::InvalidPool)?;

        let waiting = pool.waiters.len();
        let preempt = pool.waiters.force_wake_all(scheduler, || WaitStatus::Deleted);
        drop(state);

        info!("Memory pool '{}' deleted ({} waiters released)", pool.name, waiting);
        suspend::yield_if_preempted(scheduler, preempt);
        Ok(pool.region)
    }

    pub fn information(&self, handle: PoolHandle) -> PoolResult<PoolInfo> {
        let state = self.kernel.lock();
        state
            .pools
            .get(handle)
            .map(MemoryPool::info)
            .ok_or(PoolError::InvalidPool)
    }

    /// Blocks of the pool in address order, excluding the trailer
    pub fn layout(&self, handle: PoolHandle) -> PoolResult<Vec<BlockSpan>> {
        let state = self.kernel.lock();
        state
            .pools
            .get(handle)
            .map(MemoryPool::spans)
            .ok_or(PoolError::InvalidPool)
    }

    /// Up to `max` live pools, oldest first
    pub fn pool_handles(&self, max: usize) -> Vec<PoolHandle> {
        self.kernel.lock().pools.handles(max)
    }

    /// Number of live pools
    pub fn established(&self) -> usize {
        self.kernel.lock().pools.len()
    }
}
