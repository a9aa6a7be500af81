/*!
 * Queue Manager
 * Facade over the kernel's message queues
 */

use crate::kernel::Kernel;

/// Message queue operations
///
/// Sending and receiving live in `operations`, creation and teardown in
/// `lifecycle`.
#[derive(Clone)]
pub struct QueueManager {
    pub(super) kernel: Kernel,
}

impl QueueManager {
    pub(crate) fn new(kernel: Kernel) -> Self {
        Self { kernel }
    }
}
