/*!
 * Core Types
 * Common types used across the kernel objects
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Task identifier assigned by the scheduler
pub type TaskId = u32;

/// Task priority (0 is the most urgent, 255 the least)
pub type Priority = u8;

/// Machine word moved by queues and mailboxes
pub type Word = u32;

/// Address type for memory operations
pub type Address = usize;

/// Size type for memory operations
pub type Size = usize;

/// Common result type for kernel operations
pub type KernelResult<T> = Result<T, super::errors::KernelError>;

/// How long a caller is willing to block when a request cannot complete immediately
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Suspend {
    /// Fail at once with the object's "would block" status
    NoSuspend,
    /// Block until the request is satisfied or the object goes away
    Forever,
    /// Block for at most the given duration
    Timeout(Duration),
}

impl Suspend {
    /// Whether the call may block at all
    ///
    /// A zero timeout behaves like `NoSuspend`.
    #[inline]
    pub fn may_block(&self) -> bool {
        match self {
            Suspend::NoSuspend => false,
            Suspend::Forever => true,
            Suspend::Timeout(duration) => !duration.is_zero(),
        }
    }

    /// Timeout handed to the scheduler (None = wait forever)
    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            Suspend::Timeout(duration) => Some(*duration),
            _ => None,
        }
    }
}

impl From<Option<Duration>> for Suspend {
    fn from(timeout: Option<Duration>) -> Self {
        match timeout {
            Some(duration) => Suspend::Timeout(duration),
            None => Suspend::Forever,
        }
    }
}

/// Ordering of an object's suspension list, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspendPolicy {
    /// Waiters are served in arrival order
    #[default]
    Fifo,
    /// Waiters are served by priority, arrival order among equals
    Priority,
}

impl SuspendPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuspendPolicy::Fifo => "fifo",
            SuspendPolicy::Priority => "priority",
        }
    }
}

impl fmt::Display for SuspendPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a suspension policy string is not recognised
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown suspension policy '{0}'")]
pub struct ParsePolicyError(pub String);

impl FromStr for SuspendPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fifo" => Ok(SuspendPolicy::Fifo),
            "priority" | "prio" => Ok(SuspendPolicy::Priority),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

/// Why a task is suspended, reported to the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspendReason {
    MemoryPool,
    Partition,
    Queue,
    Pipe,
    Mailbox,
    EventGroup,
    Semaphore,
}

impl SuspendReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuspendReason::MemoryPool => "memory_pool",
            SuspendReason::Partition => "partition",
            SuspendReason::Queue => "queue",
            SuspendReason::Pipe => "pipe",
            SuspendReason::Mailbox => "mailbox",
            SuspendReason::EventGroup => "event_group",
            SuspendReason::Semaphore => "semaphore",
        }
    }
}

impl fmt::Display for SuspendReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-described address range managed by a pool
///
/// The kernel never dereferences the range; it only hands out addresses
/// inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRegion {
    pub start: Address,
    pub size: Size,
}

impl MemoryRegion {
    pub const fn new(start: Address, size: Size) -> Self {
        Self { start, size }
    }

    #[inline]
    pub fn end(&self) -> Address {
        self.start.saturating_add(self.size)
    }

    #[inline]
    pub fn contains(&self, address: Address) -> bool {
        address >= self.start && address < self.end()
    }
}
