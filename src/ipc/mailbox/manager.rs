/*!
 * Mailbox Manager
 */

use crate::kernel::Kernel;

/// Mailbox operations
#[derive(Clone)]
pub struct MailboxManager {
    pub(super) kernel: Kernel,
}

impl MailboxManager {
    pub(crate) fn new(kernel: Kernel) -> Self {
        Self { kernel }
    }
}
