/*!
 * Message Channels
 * Ring storage and sender/receiver bookkeeping shared by queues and pipes
 */

mod flow;
mod ring;
mod types;

pub(crate) use flow::{copy_request, deliver, fits, has_receivers, promote_senders};
pub(crate) use types::{ChannelRequest, Handoff, SendMode};

pub use ring::Channel;
pub use types::{MessageType, ParseMessageTypeError};
