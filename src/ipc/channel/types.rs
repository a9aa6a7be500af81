/*!
 * Channel Types
 * Storage units, message formats and the records suspended senders and
 * receivers carry
 */

use crate::core::limits::WORD_SIZE;
use crate::core::types::Word;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Longest length header any unit needs
pub(crate) const MAX_HEADER: usize = WORD_SIZE;

/// Element a channel buffer is made of
///
/// Variable-size messages are stored behind a length header of
/// `HEADER` units and padded to a multiple of `ALIGN` units, so a header
/// always starts on an aligned cursor.
pub trait Unit: Copy + Default + fmt::Debug + PartialEq + Eq + Send + 'static {
    /// Units taken by the length header of a variable message
    const HEADER: usize;
    /// Every variable message occupies a multiple of this many units
    const ALIGN: usize;

    fn encode_len(len: usize, header: &mut [Self]);
    fn decode_len(header: &[Self]) -> usize;
}

/// Queues store whole words; the header is one word
impl Unit for Word {
    const HEADER: usize = 1;
    const ALIGN: usize = 1;

    #[inline]
    fn encode_len(len: usize, header: &mut [Self]) {
        header[0] = len as Word;
    }

    #[inline]
    fn decode_len(header: &[Self]) -> usize {
        header[0] as usize
    }
}

/// Pipes store bytes; the header is one little-endian word and payloads
/// are padded to whole words
impl Unit for u8 {
    const HEADER: usize = WORD_SIZE;
    const ALIGN: usize = WORD_SIZE;

    #[inline]
    fn encode_len(len: usize, header: &mut [Self]) {
        header.copy_from_slice(&(len as Word).to_le_bytes());
    }

    #[inline]
    fn decode_len(header: &[Self]) -> usize {
        let mut bytes = [0; WORD_SIZE];
        bytes.copy_from_slice(header);
        Word::from_le_bytes(bytes) as usize
    }
}

/// Message format of a queue or pipe, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Every message is exactly `message_size` units
    Fixed,
    /// Messages of 1..=`message_size` units, each stored behind a length header
    Variable,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Fixed => "fixed",
            MessageType::Variable => "variable",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a message type string is not recognised
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown message type '{0}'")]
pub struct ParseMessageTypeError(pub String);

impl FromStr for MessageType {
    type Err = ParseMessageTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed" => Ok(MessageType::Fixed),
            "variable" => Ok(MessageType::Variable),
            other => Err(ParseMessageTypeError(other.to_string())),
        }
    }
}

/// What a suspended channel caller is waiting to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ChannelRequest<U> {
    Send(Vec<U>),
    Receive,
}

/// What a suspended channel caller gets back
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Handoff<U> {
    Sent,
    Received(Vec<U>),
}

/// Where a send places its message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SendMode {
    Back,
    Front,
    Broadcast,
}
