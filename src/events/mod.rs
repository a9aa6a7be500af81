/*!
 * Event Groups
 *
 * A 32-bit flag word per group. Setting flags sweeps the whole FIFO wait
 * list once, since any subset of waiters may have become satisfiable;
 * flags consumed by the woken waiters are cleared after the sweep, so
 * every waiter woken by the same set sees the same flags.
 */

mod group;
mod manager;
mod types;

pub use group::EventGroup;
pub use manager::EventGroupManager;
pub use types::{
    EventError, EventFlags, EventOperation, EventResult, GroupHandle, GroupInfo, SetOperation,
};
