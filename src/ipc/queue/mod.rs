/*!
 * Message Queues
 * Circular word buffers with fixed or variable messages, urgent sends
 * and broadcast
 */

mod lifecycle;
mod manager;
mod operations;
mod types;

pub use crate::ipc::channel::MessageType;
pub use manager::QueueManager;
pub use types::{Queue, QueueError, QueueHandle, QueueInfo, QueueResult};
