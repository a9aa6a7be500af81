/*!
 * Queue Operations
 * Send, send-to-front, broadcast and receive
 */

use super::manager::QueueManager;
use super::types::{QueueError, QueueHandle, QueueResult};
use crate::core::types::{Suspend, SuspendReason, Word};
use crate::ipc::channel::{self, ChannelRequest, Handoff, SendMode};
use crate::suspend::{self, WaitStatus, Waiter};
use log::{debug, warn};

impl QueueManager {
    /// Send a message behind everything already queued
    pub fn send(&self, handle: QueueHandle, message: &[Word], suspend: Suspend) -> QueueResult<()> {
        self.send_with(handle, message, suspend, SendMode::Back).map(|_| ())
    }

    /// Send a message ahead of every ordinary message
    ///
    /// Urgent messages keep their relative order: each one is received
    /// after any earlier urgent message still queued.
    pub fn send_to_front(
        &self,
        handle: QueueHandle,
        message: &[Word],
        suspend: Suspend,
    ) -> QueueResult<()> {
        self.send_with(handle, message, suspend, SendMode::Front).map(|_| ())
    }

    /// Copy a message to every receiver blocked on the empty queue
    ///
    /// With no receiver waiting this is an ordinary send. Returns how many
    /// receivers got the message directly.
    pub fn broadcast(
        &self,
        handle: QueueHandle,
        message: &[Word],
        suspend: Suspend,
    ) -> QueueResult<usize> {
        self.send_with(handle, message, suspend, SendMode::Broadcast)
    }

    fn send_with(
        &self,
        handle: QueueHandle,
        message: &[Word],
        suspend: Suspend,
        mode: SendMode,
    ) -> QueueResult<usize> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let wait_id = state.next_wait_id();
        let queue = state.queues.get_mut(handle).ok_or(QueueError::InvalidQueue)?;

        if !queue.accepts(message.len()) {
            warn!(
                "Rejected {}-word message for queue '{}' ({} {})",
                message.len(),
                queue.name,
                queue.message_type,
                queue.message_size
            );
            return Err(QueueError::InvalidSize);
        }
        let blocking =
            suspend::resolve(scheduler, suspend).map_err(|_| QueueError::InvalidSuspend)?;

        if channel::has_receivers(queue) {
            let served = if mode == SendMode::Broadcast {
                let receivers = queue.waiters.unlink_where(|_| true);
                let count = receivers.len();
                let mut preempt = false;
                for receiver in receivers {
                    preempt |= channel::deliver(scheduler, queue, receiver, message);
                }
                drop(state);
                suspend::yield_if_preempted(scheduler, preempt);
                count
            } else {
                let preempt = match queue.waiters.pop_front() {
                    Some(receiver) => channel::deliver(scheduler, queue, receiver, message),
                    None => false,
                };
                drop(state);
                suspend::yield_if_preempted(scheduler, preempt);
                1
            };
            return Ok(served);
        }

        if channel::fits(queue, mode, blocking, message.len()) {
            match mode {
                SendMode::Front => queue.push_urgent(message),
                SendMode::Back | SendMode::Broadcast => queue.push_back(message),
            }
            debug!(
                "Queued {}-word message on '{}' ({} messages)",
                message.len(),
                queue.name,
                queue.messages
            );
            return Ok(0);
        }

        let Some(blocking) = blocking else {
            return Err(QueueError::QueueFull);
        };

        let request = ChannelRequest::Send(message.to_vec());
        let (waiter, completion) = Waiter::new(wait_id, blocking.task, blocking.priority, request);
        match mode {
            SendMode::Front => queue.urgent.push_back(waiter),
            SendMode::Back | SendMode::Broadcast => queue.waiters.link(waiter),
        }
        debug!("Task {} waiting for room on '{}'", blocking.task, queue.name);

        let status = suspend::block_on(
            scheduler,
            &mut state,
            blocking,
            SuspendReason::Queue,
            &completion,
            |state| {
                let unlinked = state.queues.get_mut(handle).and_then(|queue| match mode {
                    SendMode::Front => queue.urgent.unlink(wait_id),
                    SendMode::Back | SendMode::Broadcast => queue.waiters.unlink(wait_id),
                });
                debug_assert!(unlinked.is_some(), "timed-out queue send was not linked");
            },
        );
        drop(state);

        match QueueError::from_wait(status)? {
            Handoff::Sent => Ok(0),
            Handoff::Received(_) => unreachable!("queue sender completed as a receiver"),
        }
    }

    /// Receive the next message into `dest`, returning its length in words
    ///
    /// Suspended urgent senders are served before buffered ordinary
    /// messages. `dest` must hold at least `message_size` words.
    pub fn receive(
        &self,
        handle: QueueHandle,
        dest: &mut [Word],
        suspend: Suspend,
    ) -> QueueResult<usize> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let wait_id = state.next_wait_id();
        let queue = state.queues.get_mut(handle).ok_or(QueueError::InvalidQueue)?;

        if dest.len() < queue.message_size {
            warn!(
                "Receive buffer of {} words too small for queue '{}'",
                dest.len(),
                queue.name
            );
            return Err(QueueError::InvalidSize);
        }
        let blocking =
            suspend::resolve(scheduler, suspend).map_err(|_| QueueError::InvalidSuspend)?;

        if !queue.urgent_pending() {
            if let Some(sender) = queue.urgent.pop_front() {
                let size = channel::copy_request(&sender.request, dest);
                debug!("Urgent message taken from task {} on '{}'", sender.task, queue.name);
                let preempt =
                    queue.urgent.wake(scheduler, sender, WaitStatus::Satisfied(Handoff::Sent));
                drop(state);
                suspend::yield_if_preempted(scheduler, preempt);
                return Ok(size);
            }
        }

        if queue.messages > 0 {
            let size = queue.pop_front(dest);
            let preempt = channel::promote_senders(scheduler, queue);
            drop(state);
            suspend::yield_if_preempted(scheduler, preempt);
            return Ok(size);
        }

        let Some(blocking) = blocking else {
            return Err(QueueError::QueueEmpty);
        };

        let (waiter, completion) =
            Waiter::new(wait_id, blocking.task, blocking.priority, ChannelRequest::Receive);
        queue.waiters.link(waiter);
        debug!("Task {} waiting for a message on '{}'", blocking.task, queue.name);

        let status = suspend::block_on(
            scheduler,
            &mut state,
            blocking,
            SuspendReason::Queue,
            &completion,
            |state| {
                let unlinked = state
                    .queues
                    .get_mut(handle)
                    .and_then(|queue| queue.waiters.unlink(wait_id));
                debug_assert!(unlinked.is_some(), "timed-out queue receive was not linked");
            },
        );
        drop(state);

        match QueueError::from_wait(status)? {
            Handoff::Received(message) => {
                dest[..message.len()].copy_from_slice(&message);
                Ok(message.len())
            }
            Handoff::Sent => unreachable!("queue receiver completed as a sender"),
        }
    }
}
