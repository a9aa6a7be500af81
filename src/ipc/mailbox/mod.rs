/*!
 * Mailboxes
 *
 * A single four-word slot. Senders hand mail straight to a waiting
 * receiver when there is one; a full slot makes senders wait, and each
 * receive that drains the slot refills it from the head waiting sender.
 */

mod lifecycle;
mod manager;
mod operations;
mod slot;
mod types;

pub use manager::MailboxManager;
pub use slot::Mailbox;
pub use types::{MailboxError, MailboxHandle, MailboxInfo, MailboxMessage, MailboxResult};
