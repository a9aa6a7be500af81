/*!
 * Event Group Control Block
 */

use super::types::{EventFlags, EventRequest, GroupInfo};
use crate::core::data_structures::InlineString;
use crate::core::types::{SuspendPolicy, SuspendReason};
use crate::scheduler::Scheduler;
use crate::suspend::{SuspensionList, WaitStatus};
use log::debug;

/// Event group control block
pub struct EventGroup {
    pub(super) name: InlineString,
    pub(super) current: EventFlags,
    /// Always FIFO
    pub(crate) waiters: SuspensionList<EventRequest, EventFlags>,
}

impl EventGroup {
    pub(super) fn new(name: InlineString) -> Self {
        Self {
            name,
            current: 0,
            waiters: SuspensionList::new(SuspendPolicy::Fifo, SuspendReason::EventGroup),
        }
    }

    /// Wake every waiter the current flags satisfy, in list order
    ///
    /// Each woken waiter sees the flags as they stood before this sweep
    /// consumed anything; consumed flags are cleared once at the end.
    pub(super) fn satisfy_waiters(&mut self, scheduler: &dyn Scheduler) -> bool {
        let current = self.current;
        let satisfied = self
            .waiters
            .unlink_where(|w| w.request.operation.matches(current, w.request.requested));

        let mut consume: EventFlags = 0;
        let mut preempt = false;
        for waiter in satisfied {
            if waiter.request.operation.consumes() {
                consume |= waiter.request.requested;
            }
            debug!(
                "Events 0x{:x} satisfy task {} on '{}'",
                current, waiter.task, self.name
            );
            preempt |= self.waiters.wake(scheduler, waiter, WaitStatus::Satisfied(current));
        }
        self.current &= !consume;
        preempt
    }

    pub(super) fn info(&self) -> GroupInfo {
        GroupInfo {
            name: self.name.clone(),
            current_events: self.current,
            tasks_waiting: self.waiters.len(),
            first_task: self.waiters.first_task(),
        }
    }
}
