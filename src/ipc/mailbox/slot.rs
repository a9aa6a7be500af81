/*!
 * Mailbox Control Block
 * One message slot and a single list shared by blocked senders and
 * receivers
 */

use super::types::{MailHandoff, MailRequest, MailboxInfo, MailboxMessage};
use crate::core::data_structures::InlineString;
use crate::core::types::{SuspendPolicy, SuspendReason};
use crate::suspend::SuspensionList;

/// Mailbox control block
pub struct Mailbox {
    pub(super) name: InlineString,
    slot: Option<MailboxMessage>,
    /// Senders while the slot is full, receivers while it is empty
    pub(crate) waiters: SuspensionList<MailRequest, MailHandoff>,
}

impl Mailbox {
    pub(super) fn new(name: InlineString, policy: SuspendPolicy) -> Self {
        Self {
            name,
            slot: None,
            waiters: SuspensionList::new(policy, SuspendReason::Mailbox),
        }
    }

    #[inline]
    pub(super) fn is_full(&self) -> bool {
        self.slot.is_some()
    }

    /// Fill the empty slot
    pub(super) fn put(&mut self, message: MailboxMessage) {
        debug_assert!(self.slot.is_none(), "mailbox slot overwritten");
        self.slot = Some(message);
    }

    pub(super) fn take(&mut self) -> Option<MailboxMessage> {
        self.slot.take()
    }

    /// Receivers only ever wait on an empty slot
    pub(super) fn has_receivers(&self) -> bool {
        !self.is_full()
            && self
                .waiters
                .front()
                .is_some_and(|w| w.request == MailRequest::Receive)
    }

    pub(super) fn info(&self) -> MailboxInfo {
        MailboxInfo {
            name: self.name.clone(),
            suspend_policy: self.waiters.policy(),
            message_present: self.is_full(),
            tasks_waiting: self.waiters.len(),
            first_task: self.waiters.first_task(),
        }
    }
}
