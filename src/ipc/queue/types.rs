/*!
 * Queue Types
 * Errors and snapshots for message queues
 */

use crate::core::data_structures::InlineString;
use crate::core::id::Handle;
use crate::core::types::{SuspendPolicy, TaskId, Word};
use crate::ipc::channel::{Channel, Handoff, MessageType, ParseMessageTypeError};
use crate::suspend::WaitStatus;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message queue control block: a channel of words
pub type Queue = Channel<Word>;

/// Handle to a message queue
pub type QueueHandle = Handle<Queue>;

/// Queue operation result
pub type QueueResult<T> = Result<T, QueueError>;

/// Message queue errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum QueueError {
    #[error("Invalid queue")]
    #[diagnostic(
        code(queue::invalid_queue),
        help("The queue handle is stale or the queue was never created.")
    )]
    InvalidQueue,

    #[error("Invalid message type")]
    #[diagnostic(code(queue::invalid_message), help("Use \"fixed\" or \"variable\"."))]
    InvalidMessage,

    #[error("Invalid size")]
    #[diagnostic(
        code(queue::invalid_size),
        help(
            "Fixed queues take exactly message_size words; variable queues at most \
             message_size. Receive buffers must hold message_size words."
        )
    )]
    InvalidSize,

    #[error("Invalid suspension request")]
    #[diagnostic(
        code(queue::invalid_suspend),
        help("Only tasks may suspend; use Suspend::NoSuspend from other contexts.")
    )]
    InvalidSuspend,

    #[error("Queue full")]
    #[diagnostic(code(queue::full), help("Retry later or suspend until a receiver makes room."))]
    QueueFull,

    #[error("Queue empty")]
    #[diagnostic(code(queue::empty), help("Retry later or suspend until a message arrives."))]
    QueueEmpty,

    #[error("Timed out waiting on queue")]
    #[diagnostic(code(queue::timeout))]
    Timeout,

    #[error("Queue deleted while waiting")]
    #[diagnostic(code(queue::deleted))]
    QueueDeleted,

    #[error("Queue reset while waiting")]
    #[diagnostic(code(queue::reset))]
    QueueReset,
}

impl QueueError {
    pub(crate) fn from_wait(status: WaitStatus<Handoff<Word>>) -> QueueResult<Handoff<Word>> {
        match status {
            WaitStatus::Satisfied(handoff) => Ok(handoff),
            WaitStatus::Timeout => Err(QueueError::Timeout),
            WaitStatus::Deleted => Err(QueueError::QueueDeleted),
            WaitStatus::Reset => Err(QueueError::QueueReset),
        }
    }
}

impl From<ParseMessageTypeError> for QueueError {
    fn from(_: ParseMessageTypeError) -> Self {
        QueueError::InvalidMessage
    }
}

/// Snapshot of a message queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueInfo {
    pub name: InlineString,
    /// Usable words of the buffer
    pub queue_size: usize,
    pub available: usize,
    pub messages: usize,
    pub message_type: MessageType,
    pub message_size: usize,
    pub suspend_policy: SuspendPolicy,
    /// Blocked senders, receivers and urgent senders together
    pub tasks_waiting: usize,
    pub first_task: Option<TaskId>,
}

impl QueueInfo {
    pub(crate) fn of(queue: &Queue) -> Self {
        Self {
            name: queue.name.clone(),
            queue_size: queue.capacity(),
            available: queue.available,
            messages: queue.messages,
            message_type: queue.message_type,
            message_size: queue.message_size,
            suspend_policy: queue.waiters.policy(),
            tasks_waiting: queue.tasks_waiting(),
            first_task: queue.waiters.first_task().or_else(|| queue.urgent.first_task()),
        }
    }
}
