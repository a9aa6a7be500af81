/*!
 * Channel Control Block
 *
 * Circular buffer with read/write cursors. Variable-size messages are
 * stored as a length header followed by the payload and any padding;
 * each part may wrap around the physical end of the buffer. Urgent
 * messages are written backwards from the read cursor so they come out
 * next; the buffered urgent messages stay in the order they were sent.
 */

use super::types::{ChannelRequest, Handoff, MessageType, Unit, MAX_HEADER};
use crate::core::data_structures::InlineString;
use crate::core::types::{SuspendPolicy, SuspendReason};
use crate::suspend::SuspensionList;

/// Message queue or pipe control block
pub struct Channel<U: Unit> {
    pub(crate) name: InlineString,
    buffer: Box<[U]>,
    /// Usable units; a fixed channel ignores a trailing partial slot
    capacity: usize,
    read: usize,
    write: usize,
    pub(crate) available: usize,
    pub(crate) messages: usize,
    /// Leading buffered messages that were sent to the front
    urgent_buffered: usize,
    pub(crate) message_type: MessageType,
    pub(crate) message_size: usize,
    /// Blocked senders (channel full) and receivers (channel empty)
    pub(crate) waiters: SuspensionList<ChannelRequest<U>, Handoff<U>>,
    /// Blocked urgent senders, served before anything buffered
    pub(crate) urgent: SuspensionList<ChannelRequest<U>, Handoff<U>>,
}

impl<U: Unit> Channel<U> {
    /// Units the largest message takes in the buffer, bookkeeping included
    ///
    /// `None` when that does not fit in a `usize`.
    pub(crate) fn footprint(message_type: MessageType, message_size: usize) -> Option<usize> {
        match message_type {
            MessageType::Fixed => Some(message_size),
            MessageType::Variable => message_size
                .checked_next_multiple_of(U::ALIGN)?
                .checked_add(U::HEADER),
        }
    }

    /// Arguments are validated by the caller.
    pub(crate) fn new(
        name: InlineString,
        buffer: Box<[U]>,
        message_type: MessageType,
        message_size: usize,
        policy: SuspendPolicy,
        reason: SuspendReason,
    ) -> Self {
        let slot = match message_type {
            MessageType::Fixed => message_size,
            MessageType::Variable => U::ALIGN,
        };
        let capacity = buffer.len() - buffer.len() % slot;

        Self {
            name,
            buffer,
            capacity,
            read: 0,
            write: 0,
            available: capacity,
            messages: 0,
            urgent_buffered: 0,
            message_type,
            message_size,
            waiters: SuspensionList::new(policy, reason),
            urgent: SuspensionList::new(SuspendPolicy::Fifo, reason),
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Units a message of `len` takes in the buffer
    #[inline]
    pub(crate) fn cost(&self, len: usize) -> usize {
        match self.message_type {
            MessageType::Fixed => len,
            MessageType::Variable => U::HEADER + len.next_multiple_of(U::ALIGN),
        }
    }

    /// Whether `len` units is a legal message for this channel
    pub(crate) fn accepts(&self, len: usize) -> bool {
        match self.message_type {
            MessageType::Fixed => len == self.message_size,
            MessageType::Variable => len > 0 && len <= self.message_size,
        }
    }

    #[inline]
    fn advance(&self, index: usize, by: usize) -> usize {
        (index + by) % self.capacity
    }

    fn copy_in(&mut self, at: usize, units: &[U]) -> usize {
        let first = units.len().min(self.capacity - at);
        self.buffer[at..at + first].copy_from_slice(&units[..first]);
        let rest = units.len() - first;
        self.buffer[..rest].copy_from_slice(&units[first..]);
        self.advance(at, units.len())
    }

    fn copy_out(&self, at: usize, dest: &mut [U]) -> usize {
        let first = dest.len().min(self.capacity - at);
        dest[..first].copy_from_slice(&self.buffer[at..at + first]);
        let rest = dest.len() - first;
        dest[first..].copy_from_slice(&self.buffer[..rest]);
        self.advance(at, dest.len())
    }

    /// Write header and payload at `at`; padding is left untouched
    fn store(&mut self, at: usize, message: &[U]) {
        let mut at = at;
        if self.message_type == MessageType::Variable {
            let mut header = [U::default(); MAX_HEADER];
            let header = &mut header[..U::HEADER];
            U::encode_len(message.len(), header);
            at = self.copy_in(at, header);
        }
        self.copy_in(at, message);
    }

    /// Append behind every buffered message; the caller checked for room
    pub(crate) fn push_back(&mut self, message: &[U]) {
        let cost = self.cost(message.len());
        self.store(self.write, message);
        self.write = self.advance(self.write, cost);
        self.available -= cost;
        self.messages += 1;
    }

    /// Insert behind earlier urgent messages and ahead of everything else;
    /// the caller checked for room
    pub(crate) fn push_urgent(&mut self, message: &[U]) {
        let mut earlier = Vec::with_capacity(self.urgent_buffered);
        for _ in 0..self.urgent_buffered {
            let mut dest = vec![U::default(); self.message_size];
            let size = self.pop_front(&mut dest);
            dest.truncate(size);
            earlier.push(dest);
        }

        self.push_front(message);
        for urgent in earlier.iter().rev() {
            self.push_front(urgent);
        }
        self.urgent_buffered = earlier.len() + 1;
    }

    fn push_front(&mut self, message: &[U]) {
        let cost = self.cost(message.len());
        self.read = (self.read + self.capacity - cost) % self.capacity;
        self.store(self.read, message);
        self.available -= cost;
        self.messages += 1;
    }

    /// Remove the oldest message into `dest`, returning its length
    ///
    /// `dest` must hold at least `message_size` units.
    pub(crate) fn pop_front(&mut self, dest: &mut [U]) -> usize {
        let mut at = self.read;
        let size = match self.message_type {
            MessageType::Fixed => self.message_size,
            MessageType::Variable => {
                let mut header = [U::default(); MAX_HEADER];
                let header = &mut header[..U::HEADER];
                at = self.copy_out(at, header);
                U::decode_len(header)
            }
        };
        self.copy_out(at, &mut dest[..size]);

        let cost = self.cost(size);
        self.read = self.advance(self.read, cost);
        self.available += cost;
        self.messages -= 1;
        self.urgent_buffered = self.urgent_buffered.saturating_sub(1);
        size
    }

    /// Drop every buffered message
    pub(crate) fn clear(&mut self) {
        self.read = 0;
        self.write = 0;
        self.available = self.capacity;
        self.messages = 0;
        self.urgent_buffered = 0;
    }

    /// Whether the next buffered message was sent to the front
    #[inline]
    pub(crate) fn urgent_pending(&self) -> bool {
        self.urgent_buffered > 0
    }

    /// Blocked senders, receivers and urgent senders together
    pub(crate) fn tasks_waiting(&self) -> usize {
        self.waiters.len() + self.urgent.len()
    }

    pub(crate) fn into_buffer(self) -> Box<[U]> {
        self.buffer
    }
}
