/*!
 * Pipe Types
 */

use crate::core::data_structures::InlineString;
use crate::core::id::Handle;
use crate::core::types::{SuspendPolicy, TaskId};
use crate::ipc::channel::{Channel, Handoff, MessageType, ParseMessageTypeError};
use crate::suspend::WaitStatus;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pipe control block: a channel of bytes
pub type Pipe = Channel<u8>;

/// Handle to a pipe
pub type PipeHandle = Handle<Pipe>;

/// Pipe operation result
pub type PipeResult<T> = Result<T, PipeError>;

/// Pipe errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum PipeError {
    #[error("Invalid pipe")]
    #[diagnostic(
        code(pipe::invalid_pipe),
        help("The pipe handle is stale or the pipe was never created.")
    )]
    InvalidPipe,

    #[error("Invalid message type")]
    #[diagnostic(code(pipe::invalid_message), help("Use \"fixed\" or \"variable\"."))]
    InvalidMessage,

    #[error("Invalid size")]
    #[diagnostic(
        code(pipe::invalid_size),
        help(
            "Fixed pipes take exactly message_size bytes; variable pipes at most \
             message_size. Receive buffers must hold message_size bytes."
        )
    )]
    InvalidSize,

    #[error("Invalid suspension request")]
    #[diagnostic(
        code(pipe::invalid_suspend),
        help("Only tasks may suspend; use Suspend::NoSuspend from other contexts.")
    )]
    InvalidSuspend,

    #[error("Pipe full")]
    #[diagnostic(code(pipe::full), help("Retry later or suspend until a receiver makes room."))]
    PipeFull,

    #[error("Pipe empty")]
    #[diagnostic(code(pipe::empty), help("Retry later or suspend until a message arrives."))]
    PipeEmpty,

    #[error("Timed out waiting on pipe")]
    #[diagnostic(code(pipe::timeout))]
    Timeout,

    #[error("Pipe deleted while waiting")]
    #[diagnostic(code(pipe::deleted))]
    PipeDeleted,

    #[error("Pipe reset while waiting")]
    #[diagnostic(code(pipe::reset))]
    PipeReset,
}

impl PipeError {
    pub(crate) fn from_wait(status: WaitStatus<Handoff<u8>>) -> PipeResult<Handoff<u8>> {
        match status {
            WaitStatus::Satisfied(handoff) => Ok(handoff),
            WaitStatus::Timeout => Err(PipeError::Timeout),
            WaitStatus::Deleted => Err(PipeError::PipeDeleted),
            WaitStatus::Reset => Err(PipeError::PipeReset),
        }
    }
}

impl From<ParseMessageTypeError> for PipeError {
    fn from(_: ParseMessageTypeError) -> Self {
        PipeError::InvalidMessage
    }
}

/// Snapshot of a pipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeInfo {
    pub name: InlineString,
    /// Usable bytes of the buffer
    pub pipe_size: usize,
    pub available: usize,
    pub messages: usize,
    pub message_type: MessageType,
    pub message_size: usize,
    pub suspend_policy: SuspendPolicy,
    pub tasks_waiting: usize,
    pub first_task: Option<TaskId>,
}

impl PipeInfo {
    pub(crate) fn of(pipe: &Pipe) -> Self {
        Self {
            name: pipe.name.clone(),
            pipe_size: pipe.capacity(),
            available: pipe.available,
            messages: pipe.messages,
            message_type: pipe.message_type,
            message_size: pipe.message_size,
            suspend_policy: pipe.waiters.policy(),
            tasks_waiting: pipe.tasks_waiting(),
            first_task: pipe.waiters.first_task().or_else(|| pipe.urgent.first_task()),
        }
    }
}
