/*!
 * Pipe Operations
 * Send, send-to-front, broadcast and receive of byte messages
 */

use super::manager::PipeManager;
use super::types::{PipeError, PipeHandle, PipeResult};
use crate::core::types::{Suspend, SuspendReason};
use crate::ipc::channel::{self, ChannelRequest, Handoff, SendMode};
use crate::suspend::{self, WaitStatus, Waiter};
use log::{debug, warn};

impl PipeManager {
    /// Send a message behind everything already in the pipe
    pub fn send(&self, handle: PipeHandle, message: &[u8], suspend: Suspend) -> PipeResult<()> {
        self.send_with(handle, message, suspend, SendMode::Back).map(|_| ())
    }

    /// Send a message ahead of every ordinary message, behind earlier
    /// urgent ones
    pub fn send_to_front(
        &self,
        handle: PipeHandle,
        message: &[u8],
        suspend: Suspend,
    ) -> PipeResult<()> {
        self.send_with(handle, message, suspend, SendMode::Front).map(|_| ())
    }

    /// Copy a message to every receiver blocked on the empty pipe,
    /// returning how many got it directly
    pub fn broadcast(
        &self,
        handle: PipeHandle,
        message: &[u8],
        suspend: Suspend,
    ) -> PipeResult<usize> {
        self.send_with(handle, message, suspend, SendMode::Broadcast)
    }

    fn send_with(
        &self,
        handle: PipeHandle,
        message: &[u8],
        suspend: Suspend,
        mode: SendMode,
    ) -> PipeResult<usize> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let wait_id = state.next_wait_id();
        let pipe = state.pipes.get_mut(handle).ok_or(PipeError::InvalidPipe)?;

        if !pipe.accepts(message.len()) {
            warn!(
                "Rejected {}-byte message for pipe '{}' ({} {})",
                message.len(),
                pipe.name,
                pipe.message_type,
                pipe.message_size
            );
            return Err(PipeError::InvalidSize);
        }
        let blocking =
            suspend::resolve(scheduler, suspend).map_err(|_| PipeError::InvalidSuspend)?;

        if channel::has_receivers(pipe) {
            let receivers = match mode {
                SendMode::Broadcast => pipe.waiters.unlink_where(|_| true),
                SendMode::Back | SendMode::Front => pipe.waiters.pop_front().into_iter().collect(),
            };
            let served = receivers.len();
            let mut preempt = false;
            for receiver in receivers {
                preempt |= channel::deliver(scheduler, pipe, receiver, message);
            }
            drop(state);
            suspend::yield_if_preempted(scheduler, preempt);
            return Ok(served);
        }

        if channel::fits(pipe, mode, blocking, message.len()) {
            match mode {
                SendMode::Front => pipe.push_urgent(message),
                SendMode::Back | SendMode::Broadcast => pipe.push_back(message),
            }
            debug!(
                "Buffered {}-byte message on pipe '{}' ({} available)",
                message.len(),
                pipe.name,
                pipe.available
            );
            return Ok(0);
        }

        let Some(blocking) = blocking else {
            return Err(PipeError::PipeFull);
        };

        let request = ChannelRequest::Send(message.to_vec());
        let (waiter, completion) = Waiter::new(wait_id, blocking.task, blocking.priority, request);
        match mode {
            SendMode::Front => pipe.urgent.push_back(waiter),
            SendMode::Back | SendMode::Broadcast => pipe.waiters.link(waiter),
        }
        debug!("Task {} waiting for room on pipe '{}'", blocking.task, pipe.name);

        let status = suspend::block_on(
            scheduler,
            &mut state,
            blocking,
            SuspendReason::Pipe,
            &completion,
            |state| {
                let unlinked = state.pipes.get_mut(handle).and_then(|pipe| match mode {
                    SendMode::Front => pipe.urgent.unlink(wait_id),
                    SendMode::Back | SendMode::Broadcast => pipe.waiters.unlink(wait_id),
                });
                debug_assert!(unlinked.is_some(), "timed-out pipe send was not linked");
            },
        );
        drop(state);

        match PipeError::from_wait(status)? {
            Handoff::Sent => Ok(0),
            Handoff::Received(_) => unreachable!("pipe sender completed as a receiver"),
        }
    }

    /// Receive the next message into `dest`, returning its length in bytes
    ///
    /// `dest` must hold at least `message_size` bytes.
    pub fn receive(
        &self,
        handle: PipeHandle,
        dest: &mut [u8],
        suspend: Suspend,
    ) -> PipeResult<usize> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let wait_id = state.next_wait_id();
        let pipe = state.pipes.get_mut(handle).ok_or(PipeError::InvalidPipe)?;

        if dest.len() < pipe.message_size {
            warn!("Receive buffer of {} bytes too small for pipe '{}'", dest.len(), pipe.name);
            return Err(PipeError::InvalidSize);
        }
        let blocking =
            suspend::resolve(scheduler, suspend).map_err(|_| PipeError::InvalidSuspend)?;

        // Suspended urgent senders go before anything ordinary that is buffered.
        if !pipe.urgent_pending() {
            if let Some(sender) = pipe.urgent.pop_front() {
                let size = channel::copy_request(&sender.request, dest);
                let preempt =
                    pipe.urgent.wake(scheduler, sender, WaitStatus::Satisfied(Handoff::Sent));
                drop(state);
                suspend::yield_if_preempted(scheduler, preempt);
                return Ok(size);
            }
        }

        if pipe.messages > 0 {
            let size = pipe.pop_front(dest);
            let preempt = channel::promote_senders(scheduler, pipe);
            drop(state);
            suspend::yield_if_preempted(scheduler, preempt);
            return Ok(size);
        }

        let Some(blocking) = blocking else {
            return Err(PipeError::PipeEmpty);
        };

        let (waiter, completion) =
            Waiter::new(wait_id, blocking.task, blocking.priority, ChannelRequest::Receive);
        pipe.waiters.link(waiter);
        debug!("Task {} waiting for a message on pipe '{}'", blocking.task, pipe.name);

        let status = suspend::block_on(
            scheduler,
            &mut state,
            blocking,
            SuspendReason::Pipe,
            &completion,
            |state| {
                let unlinked = state
                    .pipes
                    .get_mut(handle)
                    .and_then(|pipe| pipe.waiters.unlink(wait_id));
                debug_assert!(unlinked.is_some(), "timed-out pipe receive was not linked");
            },
        );
        drop(state);

        match PipeError::from_wait(status)? {
            Handoff::Received(message) => {
                dest[..message.len()].copy_from_slice(&message);
                Ok(message.len())
            }
            Handoff::Sent => unreachable!("pipe receiver completed as a sender"),
        }
    }
}
