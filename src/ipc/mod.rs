/*!
 * IPC Module
 * Message passing between tasks: word queues, byte pipes and single-slot
 * mailboxes
 */

mod channel;
pub mod mailbox;
pub mod pipe;
pub mod queue;

pub use channel::{MessageType, ParseMessageTypeError};
pub use mailbox::{MailboxError, MailboxHandle, MailboxInfo, MailboxManager, MailboxResult};
pub use pipe::{PipeError, PipeHandle, PipeInfo, PipeManager, PipeResult};
pub use queue::{QueueError, QueueHandle, QueueInfo, QueueManager, QueueResult};
