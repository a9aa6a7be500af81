/*!
 * Event Group Types
 * Errors, operation codes and snapshots for event groups
 */

use super::group::EventGroup;
use crate::core::data_structures::InlineString;
use crate::core::id::Handle;
use crate::core::types::TaskId;
use crate::suspend::WaitStatus;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Handle to an event group
pub type GroupHandle = Handle<EventGroup>;

/// Event group operation result
pub type EventResult<T> = Result<T, EventError>;

/// Event flags of one group
pub type EventFlags = u32;

/// Event group errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum EventError {
    #[error("Invalid event group")]
    #[diagnostic(
        code(events::invalid_group),
        help("The group handle is stale or the group was never created.")
    )]
    InvalidGroup,

    #[error("Invalid event operation {0}")]
    #[diagnostic(
        code(events::invalid_operation),
        help(
            "Retrieve takes OR (0), OR_CONSUME (1), AND (2) or AND_CONSUME (3); \
             set takes OR (0) or AND (2)."
        )
    )]
    InvalidOperation(u32),

    #[error("Invalid suspension request")]
    #[diagnostic(
        code(events::invalid_suspend),
        help("Only tasks may suspend; use Suspend::NoSuspend from other contexts.")
    )]
    InvalidSuspend,

    #[error("Requested events not present")]
    #[diagnostic(code(events::not_present), help("Suspend to wait for the events to be set."))]
    NotPresent,

    #[error("Timed out waiting for events")]
    #[diagnostic(code(events::timeout))]
    Timeout,

    #[error("Event group deleted while waiting")]
    #[diagnostic(code(events::group_deleted))]
    GroupDeleted,
}

impl EventError {
    pub(crate) fn from_wait(status: WaitStatus<EventFlags>) -> EventResult<EventFlags> {
        match status {
            WaitStatus::Satisfied(actual) => Ok(actual),
            WaitStatus::Timeout => Err(EventError::Timeout),
            WaitStatus::Deleted | WaitStatus::Reset => Err(EventError::GroupDeleted),
        }
    }
}

/// How a retrieve request matches the group's flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOperation {
    /// Any requested flag set
    Or,
    /// Any requested flag set; clear the requested flags on success
    OrConsume,
    /// Every requested flag set
    And,
    /// Every requested flag set; clear them on success
    AndConsume,
}

impl EventOperation {
    /// Whether `current` satisfies a request for `requested`
    #[inline]
    pub fn matches(&self, current: EventFlags, requested: EventFlags) -> bool {
        match self {
            EventOperation::Or | EventOperation::OrConsume => current & requested != 0,
            EventOperation::And | EventOperation::AndConsume => current & requested == requested,
        }
    }

    #[inline]
    pub fn consumes(&self) -> bool {
        matches!(self, EventOperation::OrConsume | EventOperation::AndConsume)
    }

    /// Raw option code
    pub fn code(&self) -> u32 {
        match self {
            EventOperation::Or => 0,
            EventOperation::OrConsume => 1,
            EventOperation::And => 2,
            EventOperation::AndConsume => 3,
        }
    }
}

impl TryFrom<u32> for EventOperation {
    type Error = EventError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(EventOperation::Or),
            1 => Ok(EventOperation::OrConsume),
            2 => Ok(EventOperation::And),
            3 => Ok(EventOperation::AndConsume),
            other => Err(EventError::InvalidOperation(other)),
        }
    }
}

impl fmt::Display for EventOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventOperation::Or => "or",
            EventOperation::OrConsume => "or_consume",
            EventOperation::And => "and",
            EventOperation::AndConsume => "and_consume",
        };
        f.write_str(name)
    }
}

/// How a set request combines with the group's flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOperation {
    /// Keep only the flags also in the mask
    And,
    /// Add the flags in the mask
    Or,
}

impl SetOperation {
    #[inline]
    pub fn apply(&self, current: EventFlags, mask: EventFlags) -> EventFlags {
        match self {
            SetOperation::And => current & mask,
            SetOperation::Or => current | mask,
        }
    }
}

impl TryFrom<u32> for SetOperation {
    type Error = EventError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(SetOperation::Or),
            2 => Ok(SetOperation::And),
            other => Err(EventError::InvalidOperation(other)),
        }
    }
}

/// Pending retrieve of a suspended caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EventRequest {
    pub requested: EventFlags,
    pub operation: EventOperation,
}

/// Snapshot of an event group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub name: InlineString,
    pub current_events: EventFlags,
    pub tasks_waiting: usize,
    pub first_task: Option<TaskId>,
}
