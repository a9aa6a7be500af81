/*!
 * Mailbox Types
 */

use super::slot::Mailbox;
use crate::core::data_structures::InlineString;
use crate::core::id::Handle;
use crate::core::limits::MAILBOX_MESSAGE_WORDS;
use crate::core::types::{SuspendPolicy, TaskId, Word};
use crate::suspend::WaitStatus;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Handle to a mailbox
pub type MailboxHandle = Handle<Mailbox>;

/// Mailbox operation result
pub type MailboxResult<T> = Result<T, MailboxError>;

/// A mailbox message is always exactly four words
pub type MailboxMessage = [Word; MAILBOX_MESSAGE_WORDS];

/// Mailbox errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum MailboxError {
    #[error("Invalid mailbox")]
    #[diagnostic(
        code(mailbox::invalid_mailbox),
        help("The mailbox handle is stale or the mailbox was never created.")
    )]
    InvalidMailbox,

    #[error("Invalid suspension request")]
    #[diagnostic(
        code(mailbox::invalid_suspend),
        help("Only tasks may suspend; use Suspend::NoSuspend from other contexts.")
    )]
    InvalidSuspend,

    #[error("Mailbox full")]
    #[diagnostic(
        code(mailbox::full),
        help("Retry later or suspend until the message is received.")
    )]
    MailboxFull,

    #[error("Mailbox empty")]
    #[diagnostic(code(mailbox::empty), help("Retry later or suspend until a message arrives."))]
    MailboxEmpty,

    #[error("Timed out waiting on mailbox")]
    #[diagnostic(code(mailbox::timeout))]
    Timeout,

    #[error("Mailbox deleted while waiting")]
    #[diagnostic(code(mailbox::deleted))]
    MailboxDeleted,

    #[error("Mailbox reset while waiting")]
    #[diagnostic(code(mailbox::reset))]
    MailboxReset,
}

impl MailboxError {
    pub(crate) fn from_wait(status: WaitStatus<MailHandoff>) -> MailboxResult<MailHandoff> {
        match status {
            WaitStatus::Satisfied(handoff) => Ok(handoff),
            WaitStatus::Timeout => Err(MailboxError::Timeout),
            WaitStatus::Deleted => Err(MailboxError::MailboxDeleted),
            WaitStatus::Reset => Err(MailboxError::MailboxReset),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MailRequest {
    Send(MailboxMessage),
    Receive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MailHandoff {
    Sent,
    Received(MailboxMessage),
}

/// Snapshot of a mailbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxInfo {
    pub name: InlineString,
    pub suspend_policy: SuspendPolicy,
    pub message_present: bool,
    pub tasks_waiting: usize,
    pub first_task: Option<TaskId>,
}
