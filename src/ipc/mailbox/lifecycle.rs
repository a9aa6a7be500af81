/*!
 * Mailbox Lifecycle Operations
 */

use super::manager::MailboxManager;
use super::slot::Mailbox;
use super::types::{MailboxError, MailboxHandle, MailboxInfo, MailboxResult};
use crate::core::types::SuspendPolicy;
use crate::suspend::{self, WaitStatus};
use log::info;

impl MailboxManager {
    /// Create an empty mailbox
    pub fn create(&self, name: &str, policy: SuspendPolicy) -> MailboxResult<MailboxHandle> {
        let name = self.kernel.object_name(name);
        let handle = self
            .kernel
            .lock()
            .mailboxes
            .insert(Mailbox::new(name.clone(), policy));

        info!("Mailbox '{}' created, {} suspension", name, policy);
        Ok(handle)
    }

    /// Empty the slot and release every suspended caller with `MailboxReset`
    pub fn reset(&self, handle: MailboxHandle) -> MailboxResult<()> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let mailbox = state
            .mailboxes
            .get_mut(handle)
            .ok_or(MailboxError::InvalidMailbox)?;

        let waiting = mailbox.waiters.len();
        let preempt = mailbox.waiters.force_wake_all(scheduler, || WaitStatus::Reset);
        mailbox.take();
        info!("Mailbox '{}' reset ({} waiters released)", mailbox.name, waiting);
        drop(state);

        suspend::yield_if_preempted(scheduler, preempt);
        Ok(())
    }

    /// Delete a mailbox, releasing every suspended caller with
    /// `MailboxDeleted`
    pub fn delete(&self, handle: MailboxHandle) -> MailboxResult<()> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let mut mailbox = state
            .mailboxes
            .remove(handle)
            .ok_or(MailboxError::InvalidMailbox)?;

        let waiting = mailbox.waiters.len();
        let preempt = mailbox.waiters.force_wake_all(scheduler, || WaitStatus::Deleted);
        drop(state);

        info!("Mailbox '{}' deleted ({} waiters released)", mailbox.name, waiting);
        suspend::yield_if_preempted(scheduler, preempt);
        Ok(())
    }

    pub fn information(&self, handle: MailboxHandle) -> MailboxResult<MailboxInfo> {
        let state = self.kernel.lock();
        state
            .mailboxes
            .get(handle)
            .map(Mailbox::info)
            .ok_or(MailboxError::InvalidMailbox)
    }

    /// Up to `max` live mailboxes, oldest first
    pub fn mailbox_handles(&self, max: usize) -> Vec<MailboxHandle> {
        self.kernel.lock().mailboxes.handles(max)
    }

    /// Number of live mailboxes
    pub fn established(&self) -> usize {
        self.kernel.lock().mailboxes.len()
    }
}
