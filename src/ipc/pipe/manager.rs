/*!
 * Pipe Manager
 * Facade over the kernel's pipes
 */

use crate::kernel::Kernel;

/// Byte pipe operations
///
/// A pipe is a queue whose messages are byte strings. Variable messages
/// carry a one-word length header and are padded to whole words.
#[derive(Clone)]
pub struct PipeManager {
    pub(super) kernel: Kernel,
}

impl PipeManager {
    pub(crate) fn new(kernel: Kernel) -> Self {
        Self { kernel }
    }
}
