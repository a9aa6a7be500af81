/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::data_structures::InlineString;
use miette::Diagnostic;
use thiserror::Error;

// Re-export the per-object error types
pub use crate::events::EventError;
pub use crate::ipc::mailbox::MailboxError;
pub use crate::ipc::pipe::PipeError;
pub use crate::ipc::queue::QueueError;
pub use crate::memory::PoolError;
pub use crate::partition::PartitionError;
pub use crate::semaphore::SemaphoreError;

/// Unified kernel error type with miette diagnostics
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum KernelError {
    #[error("Memory pool error: {0}")]
    #[diagnostic(transparent)]
    Pool(#[from] PoolError),

    #[error("Partition pool error: {0}")]
    #[diagnostic(transparent)]
    Partition(#[from] PartitionError),

    #[error("Queue error: {0}")]
    #[diagnostic(transparent)]
    Queue(#[from] QueueError),

    #[error("Pipe error: {0}")]
    #[diagnostic(transparent)]
    Pipe(#[from] PipeError),

    #[error("Mailbox error: {0}")]
    #[diagnostic(transparent)]
    Mailbox(#[from] MailboxError),

    #[error("Event group error: {0}")]
    #[diagnostic(transparent)]
    Event(#[from] EventError),

    #[error("Semaphore error: {0}")]
    #[diagnostic(transparent)]
    Semaphore(#[from] SemaphoreError),

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(kernel::configuration_error),
        help("Invalid configuration. Review configuration parameters.")
    )]
    Configuration(InlineString),
}

impl KernelError {
    /// Whether the error reports a bounded suspension that ran out
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            KernelError::Pool(PoolError::Timeout)
                | KernelError::Partition(PartitionError::Timeout)
                | KernelError::Queue(QueueError::Timeout)
                | KernelError::Pipe(PipeError::Timeout)
                | KernelError::Mailbox(MailboxError::Timeout)
                | KernelError::Event(EventError::Timeout)
                | KernelError::Semaphore(SemaphoreError::Timeout)
        )
    }
}
