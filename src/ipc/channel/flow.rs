/*!
 * Channel Flow
 *
 * Hand-off and sender promotion rules shared by queues and pipes: who a
 * new message goes to, whether it may be buffered, and which suspended
 * senders move into room freed by a receive.
 */

use super::ring::Channel;
use super::types::{ChannelRequest, Handoff, MessageType, SendMode, Unit};
use crate::core::types::{Priority, SuspendPolicy};
use crate::scheduler::Scheduler;
use crate::suspend::{Blocking, SuspensionList, WaitStatus, Waiter};
use log::debug;

type Pending<U> = SuspensionList<ChannelRequest<U>, Handoff<U>>;

/// Receivers only ever wait on an empty channel
pub(crate) fn has_receivers<U: Unit>(channel: &Channel<U>) -> bool {
    channel.messages == 0
        && channel
            .waiters
            .front()
            .is_some_and(|w| matches!(w.request, ChannelRequest::Receive))
}

/// Whether a new message can be buffered right now
///
/// On a variable channel with senders already suspended, a caller that
/// is not more urgent than the head sender sees the channel as full so
/// it cannot slip a short message in ahead of the pending ones.
pub(crate) fn fits<U: Unit>(
    channel: &Channel<U>,
    mode: SendMode,
    blocking: Option<Blocking>,
    len: usize,
) -> bool {
    let required = channel.cost(len);
    if channel.message_type != MessageType::Variable || channel.messages == 0 {
        return required <= channel.available;
    }

    let Some(head) = pending(channel, mode).front() else {
        return required <= channel.available;
    };

    let yields = match (pending(channel, mode).policy(), blocking) {
        (SuspendPolicy::Fifo, _) | (_, None) => true,
        (SuspendPolicy::Priority, Some(caller)) => outranks_or_ties(head.priority, caller.priority),
    };
    !yields && required <= channel.available
}

#[inline]
fn outranks_or_ties(head: Priority, caller: Priority) -> bool {
    head <= caller
}

fn pending<U: Unit>(channel: &Channel<U>, mode: SendMode) -> &Pending<U> {
    match mode {
        SendMode::Front => &channel.urgent,
        SendMode::Back | SendMode::Broadcast => &channel.waiters,
    }
}

/// Complete a suspended receiver with a copy of `message`
pub(crate) fn deliver<U: Unit>(
    scheduler: &dyn Scheduler,
    channel: &Channel<U>,
    receiver: Waiter<ChannelRequest<U>, Handoff<U>>,
    message: &[U],
) -> bool {
    debug!("Message handed directly to task {} on '{}'", receiver.task, channel.name);
    channel.waiters.wake(
        scheduler,
        receiver,
        WaitStatus::Satisfied(Handoff::Received(message.to_vec())),
    )
}

/// Copy a suspended sender's message into `dest`, returning its length
pub(crate) fn copy_request<U: Unit>(request: &ChannelRequest<U>, dest: &mut [U]) -> usize {
    match request {
        ChannelRequest::Send(message) => {
            dest[..message.len()].copy_from_slice(message);
            message.len()
        }
        ChannelRequest::Receive => unreachable!("receiver linked as an urgent sender"),
    }
}

/// Move suspended senders into the freed room, urgent ones first
///
/// Stops at the first sender of a list whose message does not fit, and
/// never moves an ordinary sender while an urgent one is still waiting.
pub(crate) fn promote_senders<U: Unit>(
    scheduler: &dyn Scheduler,
    channel: &mut Channel<U>,
) -> bool {
    let mut preempt = false;

    while let Some(len) = head_send_len(channel, SendMode::Front) {
        if channel.cost(len) > channel.available {
            return preempt;
        }
        let Some(sender) = channel.urgent.pop_front() else { break };
        if let ChannelRequest::Send(message) = &sender.request {
            channel.push_urgent(message);
        }
        preempt |= channel.urgent.wake(scheduler, sender, WaitStatus::Satisfied(Handoff::Sent));
    }

    while let Some(len) = head_send_len(channel, SendMode::Back) {
        if channel.cost(len) > channel.available {
            break;
        }
        let Some(sender) = channel.waiters.pop_front() else { break };
        if let ChannelRequest::Send(message) = &sender.request {
            channel.push_back(message);
        }
        debug!("Pending message from task {} buffered on '{}'", sender.task, channel.name);
        preempt |= channel.waiters.wake(scheduler, sender, WaitStatus::Satisfied(Handoff::Sent));
    }

    preempt
}

fn head_send_len<U: Unit>(channel: &Channel<U>, mode: SendMode) -> Option<usize> {
    match &pending(channel, mode).front()?.request {
        ChannelRequest::Send(message) => Some(message.len()),
        ChannelRequest::Receive => None,
    }
}
