/*!
 * Counting Semaphores
 * Obtain suspends at zero; release hands the count straight to the head
 * waiter instead of incrementing
 */

use super::types::{SemaphoreError, SemaphoreHandle, SemaphoreInfo, SemaphoreResult};
use crate::core::data_structures::InlineString;
use crate::core::types::{Suspend, SuspendPolicy, SuspendReason};
use crate::kernel::Kernel;
use crate::suspend::{self, SuspensionList, WaitStatus, Waiter};
use log::{debug, info, warn};

/// Semaphore control block
pub struct Semaphore {
    name: InlineString,
    count: u32,
    pub(crate) waiters: SuspensionList<(), ()>,
}

impl Semaphore {
    fn info(&self) -> SemaphoreInfo {
        SemaphoreInfo {
            name: self.name.clone(),
            current_count: self.count,
            suspend_policy: self.waiters.policy(),
            tasks_waiting: self.waiters.len(),
            first_task: self.waiters.first_task(),
        }
    }
}

/// Semaphore operations
#[derive(Clone)]
pub struct SemaphoreManager {
    kernel: Kernel,
}

impl SemaphoreManager {
    pub(crate) fn new(kernel: Kernel) -> Self {
        Self { kernel }
    }

    pub fn create(
        &self,
        name: &str,
        initial_count: u32,
        policy: SuspendPolicy,
    ) -> SemaphoreResult<SemaphoreHandle> {
        let name = self.kernel.object_name(name);
        let semaphore = Semaphore {
            name: name.clone(),
            count: initial_count,
            waiters: SuspensionList::new(policy, SuspendReason::Semaphore),
        };
        let handle = self.kernel.lock().semaphores.insert(semaphore);

        info!(
            "Semaphore '{}' created with count {}, {} suspension",
            name, initial_count, policy
        );
        Ok(handle)
    }

    /// Take one unit of the count
    pub fn obtain(&self, handle: SemaphoreHandle, suspend: Suspend) -> SemaphoreResult<()> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let wait_id = state.next_wait_id();
        let semaphore = state
            .semaphores
            .get_mut(handle)
            .ok_or(SemaphoreError::InvalidSemaphore)?;
        let blocking =
            suspend::resolve(scheduler, suspend).map_err(|_| SemaphoreError::InvalidSuspend)?;

        if semaphore.count > 0 {
            semaphore.count -= 1;
            return Ok(());
        }

        let Some(blocking) = blocking else {
            return Err(SemaphoreError::Unavailable);
        };

        let (waiter, completion) = Waiter::new(wait_id, blocking.task, blocking.priority, ());
        semaphore.waiters.link(waiter);
        debug!("Task {} waiting on semaphore '{}'", blocking.task, semaphore.name);

        let status = suspend::block_on(
            scheduler,
            &mut state,
            blocking,
            SuspendReason::Semaphore,
            &completion,
            |state| {
                let unlinked = state
                    .semaphores
                    .get_mut(handle)
                    .and_then(|semaphore| semaphore.waiters.unlink(wait_id));
                debug_assert!(unlinked.is_some(), "timed-out semaphore request was not linked");
            },
        );
        drop(state);

        SemaphoreError::from_wait(status)
    }

    /// Give one unit back
    pub fn release(&self, handle: SemaphoreHandle) -> SemaphoreResult<()> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let semaphore = state
            .semaphores
            .get_mut(handle)
            .ok_or(SemaphoreError::InvalidSemaphore)?;

        let preempt = match semaphore.waiters.pop_front() {
            Some(waiter) => {
                debug!("Semaphore '{}' handed to task {}", semaphore.name, waiter.task);
                semaphore.waiters.wake(scheduler, waiter, WaitStatus::Satisfied(()))
            }
            None => {
                let Some(count) = semaphore.count.checked_add(1) else {
                    warn!("Semaphore '{}' release would overflow", semaphore.name);
                    return Err(SemaphoreError::CountRollover);
                };
                semaphore.count = count;
                false
            }
        };
        drop(state);

        suspend::yield_if_preempted(scheduler, preempt);
        Ok(())
    }

    /// Set a new count, releasing every suspended caller with
    /// `SemaphoreReset`
    pub fn reset(&self, handle: SemaphoreHandle, initial_count: u32) -> SemaphoreResult<()> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let semaphore = state
            .semaphores
            .get_mut(handle)
            .ok_or(SemaphoreError::InvalidSemaphore)?;

        let waiting = semaphore.waiters.len();
        let preempt = semaphore.waiters.force_wake_all(scheduler, || WaitStatus::Reset);
        semaphore.count = initial_count;
        info!(
            "Semaphore '{}' reset to {} ({} waiters released)",
            semaphore.name, initial_count, waiting
        );
        drop(state);

        suspend::yield_if_preempted(scheduler, preempt);
        Ok(())
    }

    /// Delete a semaphore, releasing every suspended caller with
    /// `SemaphoreDeleted`
    pub fn delete(&self, handle: SemaphoreHandle) -> SemaphoreResult<()> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let mut semaphore = state
            .semaphores
            .remove(handle)
            .ok_or(SemaphoreError::InvalidSemaphore)?;

        let waiting = semaphore.waiters.len();
        let preempt = semaphore.waiters.force_wake_all(scheduler, || WaitStatus::Deleted);
        drop(state);

        info!("Semaphore '{}' deleted ({} waiters released)", semaphore.name, waiting);
        suspend::yield_if_preempted(scheduler, preempt);
        Ok(())
    }

    pub fn information(&self, handle: SemaphoreHandle) -> SemaphoreResult<SemaphoreInfo> {
        let state = self.kernel.lock();
        state
            .semaphores
            .get(handle)
            .map(Semaphore::info)
            .ok_or(SemaphoreError::InvalidSemaphore)
    }

    /// Up to `max` live semaphores, oldest first
    pub fn semaphore_handles(&self, max: usize) -> Vec<SemaphoreHandle> {
        self.kernel.lock().semaphores.handles(max)
    }

    /// Number of live semaphores
    pub fn established(&self) -> usize {
        self.kernel.lock().semaphores.len()
    }
}
