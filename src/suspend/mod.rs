/*!
 * Suspension Primitive
 *
 * Blocking and waking shared by every kernel object: suspend records,
 * ordered suspension lists, and the block/cleanup sequence run against
 * the scheduler.
 */

mod list;
mod protocol;
mod record;

pub use list::SuspensionList;
pub use protocol::{block_on, resolve, yield_if_preempted, Blocking, NotBlockable};
pub use record::{Completion, WaitId, WaitStatus, Waiter};
