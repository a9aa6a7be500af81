/*!
 * System Limits and Constants
 *
 * Layout constants shared by the kernel objects. Block and partition
 * overheads are the sizes of the headers the allocators account for in
 * front of every block, even though headers live in side tables here.
 */

use crate::core::types::Priority;

// =============================================================================
// MACHINE
// =============================================================================

/// Size of one machine word in bytes
pub const WORD_SIZE: usize = 4;

// =============================================================================
// DYNAMIC MEMORY POOLS
// =============================================================================

/// Bytes accounted for each dynamic block header
pub const DM_OVERHEAD: usize = 24;

// =============================================================================
// PARTITION POOLS
// =============================================================================

/// Bytes accounted for each partition header
pub const PM_OVERHEAD: usize = 8;

// =============================================================================
// MAILBOXES
// =============================================================================

/// Every mailbox message is exactly this many words
pub const MAILBOX_MESSAGE_WORDS: usize = 4;

// =============================================================================
// NAMES AND TASKS
// =============================================================================

/// Capacity of an object name, including the terminator the name field reserves
pub const MAX_NAME: usize = 8;

/// Priority given to tasks registered without an explicit one
pub const DEFAULT_TASK_PRIORITY: Priority = 128;

/// Lowest urgency a task can have
pub const LOWEST_PRIORITY: Priority = Priority::MAX;

/// Round `value` up to the next multiple of the machine word
///
/// `None` when the rounded value does not fit in a `usize`.
#[inline]
pub const fn round_to_word(value: usize) -> Option<usize> {
    match value % WORD_SIZE {
        0 => Some(value),
        rem => value.checked_add(WORD_SIZE - rem),
    }
}
