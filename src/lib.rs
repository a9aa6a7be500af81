/*!
 * RTOS Kernel Library
 *
 * Kernel objects of a real-time executive: dynamic memory pools,
 * partition pools, message queues, pipes, mailboxes, event groups and
 * counting semaphores, all blocking through one suspension protocol
 * against a pluggable scheduler.
 */

pub mod core;
pub mod events;
pub mod ipc;
pub mod kernel;
pub mod memory;
pub mod monitoring;
pub mod partition;
pub mod registry;
pub mod scheduler;
pub mod semaphore;
pub mod suspend;

// Re-exports
pub use crate::core::{
    Handle, InlineString, KernelConfig, KernelError, KernelResult, MemoryRegion, Priority,
    Suspend, SuspendPolicy, SuspendReason, TaskId, Word,
};
pub use events::{EventGroupManager, EventOperation, GroupHandle, SetOperation};
pub use ipc::{
    MailboxHandle, MailboxManager, MessageType, PipeHandle, PipeManager, QueueHandle, QueueManager,
};
pub use kernel::Kernel;
pub use memory::{MemoryPoolManager, PoolHandle};
pub use monitoring::init_tracing;
pub use partition::{PartitionHandle, PartitionManager};
pub use scheduler::{Scheduler, ThreadScheduler};
pub use semaphore::{SemaphoreHandle, SemaphoreManager};
