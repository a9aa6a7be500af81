/*!
 * Queue Lifecycle Operations
 * Create, reset, delete and inspection
 */

use super::manager::QueueManager;
use super::types::{Queue, QueueError, QueueHandle, QueueInfo, QueueResult};
use crate::core::types::{SuspendPolicy, SuspendReason, Word};
use crate::ipc::channel::MessageType;
use crate::suspend::{self, WaitStatus};
use log::{info, warn};

impl QueueManager {
    /// Create a queue over a caller-supplied buffer
    ///
    /// A fixed queue only uses whole message slots of the buffer.
    pub fn create(
        &self,
        name: &str,
        buffer: Box<[Word]>,
        message_type: MessageType,
        message_size: usize,
        policy: SuspendPolicy,
    ) -> QueueResult<QueueHandle> {
        let queue_size = buffer.len();
        let fits = Queue::footprint(message_type, message_size)
            .is_some_and(|footprint| footprint <= queue_size);
        if queue_size == 0 || message_size == 0 || !fits {
            warn!(
                "Rejected queue '{}': {} words for {} messages of {} words",
                name, queue_size, message_type, message_size
            );
            return Err(QueueError::InvalidSize);
        }

        let name = self.kernel.object_name(name);
        let queue = Queue::new(
            name.clone(),
            buffer,
            message_type,
            message_size,
            policy,
            SuspendReason::Queue,
        );
        let handle = self.kernel.lock().queues.insert(queue);

        info!(
            "Queue '{}' created: {} words, {} messages up to {} words, {} suspension",
            name, queue_size, message_type, message_size, policy
        );
        Ok(handle)
    }

    /// Discard every message and release all suspended callers with
    /// `QueueReset`
    pub fn reset(&self, handle: QueueHandle) -> QueueResult<()> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let queue = state.queues.get_mut(handle).ok_or(QueueError::InvalidQueue)?;

        let waiting = queue.tasks_waiting();
        let mut preempt = queue.waiters.force_wake_all(scheduler, || WaitStatus::Reset);
        preempt |= queue.urgent.force_wake_all(scheduler, || WaitStatus::Reset);
        queue.clear();
        info!("Queue '{}' reset ({} waiters released)", queue.name, waiting);
        drop(state);

        suspend::yield_if_preempted(scheduler, preempt);
        Ok(())
    }

    /// Delete a queue, releasing all suspended callers with `QueueDeleted`
    ///
    /// The buffer goes back to the caller.
    pub fn delete(&self, handle: QueueHandle) -> QueueResult<Box<[Word]>> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let mut queue = state.queues.remove(handle).ok_or(QueueError::InvalidQueue)?;

        let waiting = queue.tasks_waiting();
        let mut preempt = queue.waiters.force_wake_all(scheduler, || WaitStatus::Deleted);
        preempt |= queue.urgent.force_wake_all(scheduler, || WaitStatus::Deleted);
        drop(state);

        info!("Queue '{}' deleted ({} waiters released)", queue.name, waiting);
        suspend::yield_if_preempted(scheduler, preempt);
        Ok(queue.into_buffer())
    }

    pub fn information(&self, handle: QueueHandle) -> QueueResult<QueueInfo> {
        let state = self.kernel.lock();
        state
            .queues
            .get(handle)
            .map(QueueInfo::of)
            .ok_or(QueueError::InvalidQueue)
    }

    /// Up to `max` live queues, oldest first
    pub fn queue_handles(&self, max: usize) -> Vec<QueueHandle> {
        self.kernel.lock().queues.handles(max)
    }

    /// Number of live queues
    pub fn established(&self) -> usize {
        self.kernel.lock().queues.len()
    }
}
