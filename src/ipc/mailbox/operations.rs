/*!
 * Mailbox Operations
 * Send, broadcast and receive
 */

use super::manager::MailboxManager;
use super::types::{
    MailHandoff, MailRequest, MailboxError, MailboxHandle, MailboxMessage, MailboxResult,
};
use crate::core::types::{Suspend, SuspendReason};
use crate::suspend::{self, WaitStatus, Waiter};
use log::debug;

impl MailboxManager {
    /// Put a message in the mailbox, or hand it to a waiting receiver
    pub fn send(
        &self,
        handle: MailboxHandle,
        message: MailboxMessage,
        suspend: Suspend,
    ) -> MailboxResult<()> {
        self.send_with(handle, message, suspend, false).map(|_| ())
    }

    /// Hand a message to every waiting receiver at once
    ///
    /// With no receiver waiting this is an ordinary send. Returns how many
    /// receivers got the message directly.
    pub fn broadcast(
        &self,
        handle: MailboxHandle,
        message: MailboxMessage,
        suspend: Suspend,
    ) -> MailboxResult<usize> {
        self.send_with(handle, message, suspend, true)
    }

    fn send_with(
        &self,
        handle: MailboxHandle,
        message: MailboxMessage,
        suspend: Suspend,
        broadcast: bool,
    ) -> MailboxResult<usize> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let wait_id = state.next_wait_id();
        let mailbox = state
            .mailboxes
            .get_mut(handle)
            .ok_or(MailboxError::InvalidMailbox)?;
        let blocking =
            suspend::resolve(scheduler, suspend).map_err(|_| MailboxError::InvalidSuspend)?;

        if mailbox.has_receivers() {
            let receivers = if broadcast {
                mailbox.waiters.unlink_where(|_| true)
            } else {
                mailbox.waiters.pop_front().into_iter().collect()
            };
            let served = receivers.len();
            let mut preempt = false;
            for receiver in receivers {
                debug!("Mail handed directly to task {} on '{}'", receiver.task, mailbox.name);
                preempt |= mailbox.waiters.wake(
                    scheduler,
                    receiver,
                    WaitStatus::Satisfied(MailHandoff::Received(message)),
                );
            }
            drop(state);
            suspend::yield_if_preempted(scheduler, preempt);
            return Ok(served);
        }

        if !mailbox.is_full() {
            mailbox.put(message);
            debug!("Mail left in '{}'", mailbox.name);
            return Ok(0);
        }

        let Some(blocking) = blocking else {
            return Err(MailboxError::MailboxFull);
        };

        let (waiter, completion) =
            Waiter::new(wait_id, blocking.task, blocking.priority, MailRequest::Send(message));
        mailbox.waiters.link(waiter);
        debug!("Task {} waiting to send on '{}'", blocking.task, mailbox.name);

        let status = suspend::block_on(
            scheduler,
            &mut state,
            blocking,
            SuspendReason::Mailbox,
            &completion,
            |state| {
                let unlinked = state
                    .mailboxes
                    .get_mut(handle)
                    .and_then(|mailbox| mailbox.waiters.unlink(wait_id));
                debug_assert!(unlinked.is_some(), "timed-out mailbox send was not linked");
            },
        );
        drop(state);

        match MailboxError::from_wait(status)? {
            MailHandoff::Sent => Ok(0),
            MailHandoff::Received(_) => unreachable!("mailbox sender completed as a receiver"),
        }
    }

    /// Take the message out of the mailbox
    ///
    /// Draining the slot promotes the head waiting sender's message into it.
    pub fn receive(
        &self,
        handle: MailboxHandle,
        suspend: Suspend,
    ) -> MailboxResult<MailboxMessage> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let wait_id = state.next_wait_id();
        let mailbox = state
            .mailboxes
            .get_mut(handle)
            .ok_or(MailboxError::InvalidMailbox)?;
        let blocking =
            suspend::resolve(scheduler, suspend).map_err(|_| MailboxError::InvalidSuspend)?;

        if let Some(message) = mailbox.take() {
            let preempt = match mailbox.waiters.pop_front() {
                Some(sender) => {
                    match sender.request {
                        MailRequest::Send(pending) => mailbox.put(pending),
                        MailRequest::Receive => unreachable!("receiver waiting on a full mailbox"),
                    }
                    debug!("Pending mail from task {} moved into '{}'", sender.task, mailbox.name);
                    mailbox
                        .waiters
                        .wake(scheduler, sender, WaitStatus::Satisfied(MailHandoff::Sent))
                }
                None => false,
            };
            drop(state);
            suspend::yield_if_preempted(scheduler, preempt);
            return Ok(message);
        }

        let Some(blocking) = blocking else {
            return Err(MailboxError::MailboxEmpty);
        };

        let (waiter, completion) =
            Waiter::new(wait_id, blocking.task, blocking.priority, MailRequest::Receive);
        mailbox.waiters.link(waiter);
        debug!("Task {} waiting for mail on '{}'", blocking.task, mailbox.name);

        let status = suspend::block_on(
            scheduler,
            &mut state,
            blocking,
            SuspendReason::Mailbox,
            &completion,
            |state| {
                let unlinked = state
                    .mailboxes
                    .get_mut(handle)
                    .and_then(|mailbox| mailbox.waiters.unlink(wait_id));
                debug_assert!(unlinked.is_some(), "timed-out mailbox receive was not linked");
            },
        );
        drop(state);

        match MailboxError::from_wait(status)? {
            MailHandoff::Received(message) => Ok(message),
            MailHandoff::Sent => unreachable!("mailbox receiver completed as a sender"),
        }
    }
}
