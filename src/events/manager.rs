/*!
 * Event Group Manager
 * Set, retrieve and lifecycle of event groups
 */

use super::group::EventGroup;
use super::types::{
    EventError, EventFlags, EventOperation, EventRequest, EventResult, GroupHandle, GroupInfo,
    SetOperation,
};
use crate::core::types::{Suspend, SuspendReason};
use crate::kernel::Kernel;
use crate::suspend::{self, WaitStatus, Waiter};
use log::{debug, info};

/// Event group operations
#[derive(Clone)]
pub struct EventGroupManager {
    kernel: Kernel,
}

impl EventGroupManager {
    pub(crate) fn new(kernel: Kernel) -> Self {
        Self { kernel }
    }

    /// Create a group with every flag clear
    pub fn create(&self, name: &str) -> EventResult<GroupHandle> {
        let name = self.kernel.object_name(name);
        let handle = self.kernel.lock().groups.insert(EventGroup::new(name.clone()));
        info!("Event group '{}' created", name);
        Ok(handle)
    }

    /// Combine `mask` into the group's flags and wake whoever that satisfies
    pub fn set_events(
        &self,
        handle: GroupHandle,
        mask: EventFlags,
        operation: SetOperation,
    ) -> EventResult<()> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let group = state.groups.get_mut(handle).ok_or(EventError::InvalidGroup)?;

        group.current = operation.apply(group.current, mask);
        debug!("Event group '{}' now 0x{:x}", group.name, group.current);
        let preempt = group.satisfy_waiters(scheduler);
        drop(state);

        suspend::yield_if_preempted(scheduler, preempt);
        Ok(())
    }

    /// Wait for `requested` flags under `operation`
    ///
    /// Returns the group's flags at the moment the request was satisfied,
    /// before any consumption.
    pub fn retrieve_events(
        &self,
        handle: GroupHandle,
        requested: EventFlags,
        operation: EventOperation,
        suspend: Suspend,
    ) -> EventResult<EventFlags> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let wait_id = state.next_wait_id();
        let group = state.groups.get_mut(handle).ok_or(EventError::InvalidGroup)?;
        let blocking =
            suspend::resolve(scheduler, suspend).map_err(|_| EventError::InvalidSuspend)?;

        if operation.matches(group.current, requested) {
            let actual = group.current;
            if operation.consumes() {
                group.current &= !requested;
            }
            return Ok(actual);
        }

        let Some(blocking) = blocking else {
            return Err(EventError::NotPresent);
        };

        let request = EventRequest { requested, operation };
        let (waiter, completion) = Waiter::new(wait_id, blocking.task, blocking.priority, request);
        group.waiters.link(waiter);
        debug!(
            "Task {} waiting for 0x{:x} ({}) on '{}'",
            blocking.task, requested, operation, group.name
        );

        let status = suspend::block_on(
            scheduler,
            &mut state,
            blocking,
            SuspendReason::EventGroup,
            &completion,
            |state| {
                let unlinked = state
                    .groups
                    .get_mut(handle)
                    .and_then(|group| group.waiters.unlink(wait_id));
                debug_assert!(unlinked.is_some(), "timed-out event request was not linked");
            },
        );
        drop(state);

        EventError::from_wait(status)
    }

    /// Delete a group, releasing every suspended caller with `GroupDeleted`
    pub fn delete(&self, handle: GroupHandle) -> EventResult<()> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let mut group = state.groups.remove(handle).ok_or(EventError::InvalidGroup)?;

        let waiting = group.waiters.len();
        let preempt = group.waiters.force_wake_all(scheduler, || WaitStatus::Deleted);
        drop(state);

        info!("Event group '{}' deleted ({} waiters released)", group.name, waiting);
        suspend::yield_if_preempted(scheduler, preempt);
        Ok(())
    }

    pub fn information(&self, handle: GroupHandle) -> EventResult<GroupInfo> {
        let state = self.kernel.lock();
        state
            .groups
            .get(handle)
            .map(EventGroup::info)
            .ok_or(EventError::InvalidGroup)
    }

    /// Up to `max` live event groups, oldest first
    pub fn group_handles(&self, max: usize) -> Vec<GroupHandle> {
        self.kernel.lock().groups.handles(max)
    }

    /// Number of live event groups
    pub fn established(&self) -> usize {
        self.kernel.lock().groups.len()
    }
}
