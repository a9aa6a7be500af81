/*!
 * Queue Blocking Tests
 * Direct hand-off, sender promotion, urgent waiters and forced wakes
 */

use crate::support::{boot, eventually};
use pretty_assertions::assert_eq;
use rtos_kernel::ipc::{QueueError, QueueHandle, QueueManager};
use rtos_kernel::scheduler::TaskHandle;
use rtos_kernel::{MessageType, Suspend, SuspendPolicy, ThreadScheduler, Word};
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;

fn queue(
    queues: &QueueManager,
    words: usize,
    kind: MessageType,
    size: usize,
    policy: SuspendPolicy,
) -> QueueHandle {
    queues
        .create("blocking", vec![0; words].into_boxed_slice(), kind, size, policy)
        .unwrap()
}

fn take(queues: &QueueManager, queue: QueueHandle) -> Vec<Word> {
    let mut dest = [0; 8];
    let len = queues.receive(queue, &mut dest, Suspend::NoSuspend).unwrap();
    dest[..len].to_vec()
}

fn spawn_receiver(
    scheduler: &Arc<ThreadScheduler>,
    queues: &QueueManager,
    queue: QueueHandle,
) -> TaskHandle<Result<Vec<Word>, QueueError>> {
    let queues = queues.clone();
    scheduler
        .spawn_task("rx", 40, move || {
            let mut dest = [0; 8];
            let len = queues.receive(queue, &mut dest, Suspend::Forever)?;
            Ok(dest[..len].to_vec())
        })
        .unwrap()
}

fn spawn_sender(
    scheduler: &Arc<ThreadScheduler>,
    queues: &QueueManager,
    queue: QueueHandle,
    message: Vec<Word>,
    urgent: bool,
) -> TaskHandle<Result<(), QueueError>> {
    let queues = queues.clone();
    scheduler
        .spawn_task("tx", 40, move || {
            if urgent {
                queues.send_to_front(queue, &message, Suspend::Forever)
            } else {
                queues.send(queue, &message, Suspend::Forever)
            }
        })
        .unwrap()
}

fn waiting(queues: &QueueManager, queue: QueueHandle) -> usize {
    queues.information(queue).unwrap().tasks_waiting
}

#[test]
fn test_send_hands_message_to_waiting_receiver() {
    let (kernel, scheduler) = boot();
    let queues = kernel.queues();
    let q = queue(&queues, 8, MessageType::Fixed, 2, SuspendPolicy::Fifo);

    let receiver = spawn_receiver(&scheduler, &queues, q);
    eventually("receiver to suspend", || waiting(&queues, q) == 1);

    queues.send(q, &[4, 2], Suspend::NoSuspend).unwrap();
    assert_eq!(receiver.join().unwrap(), Ok(vec![4, 2]));

    // The message never touched the ring.
    let info = queues.information(q).unwrap();
    assert_eq!(info.messages, 0);
    assert_eq!(info.available, 8);
}

#[test]
fn test_broadcast_reaches_every_receiver() {
    let (kernel, scheduler) = boot();
    let queues = kernel.queues();
    let q = queue(&queues, 8, MessageType::Fixed, 2, SuspendPolicy::Fifo);

    let receivers: Vec<_> = (0..3).map(|_| spawn_receiver(&scheduler, &queues, q)).collect();
    eventually("receivers to suspend", || waiting(&queues, q) == 3);

    assert_eq!(queues.broadcast(q, &[1, 9], Suspend::NoSuspend), Ok(3));
    for receiver in receivers {
        assert_eq!(receiver.join().unwrap(), Ok(vec![1, 9]));
    }

    // Nobody waiting: broadcast buffers like a send.
    assert_eq!(queues.broadcast(q, &[2, 8], Suspend::NoSuspend), Ok(0));
    assert_eq!(take(&queues, q), vec![2, 8]);
}

#[test]
fn test_receive_promotes_suspended_sender() {
    let (kernel, scheduler) = boot();
    let queues = kernel.queues();
    let q = queue(&queues, 4, MessageType::Fixed, 2, SuspendPolicy::Fifo);

    queues.send(q, &[1, 1], Suspend::NoSuspend).unwrap();
    queues.send(q, &[2, 2], Suspend::NoSuspend).unwrap();
    let sender = spawn_sender(&scheduler, &queues, q, vec![3, 3], false);
    eventually("sender to suspend", || waiting(&queues, q) == 1);

    assert_eq!(take(&queues, q), vec![1, 1]);
    assert_eq!(sender.join().unwrap(), Ok(()));
    assert_eq!(queues.information(q).unwrap().messages, 2);
    assert_eq!(take(&queues, q), vec![2, 2]);
    assert_eq!(take(&queues, q), vec![3, 3]);
}

#[test]
fn test_suspended_urgent_sender_is_served_first() {
    let (kernel, scheduler) = boot();
    let queues = kernel.queues();
    let q = queue(&queues, 4, MessageType::Fixed, 2, SuspendPolicy::Fifo);

    queues.send(q, &[1, 1], Suspend::NoSuspend).unwrap();
    queues.send(q, &[2, 2], Suspend::NoSuspend).unwrap();
    let urgent = spawn_sender(&scheduler, &queues, q, vec![7, 7], true);
    eventually("urgent sender to suspend", || waiting(&queues, q) == 1);
    let normal = spawn_sender(&scheduler, &queues, q, vec![3, 3], false);
    eventually("normal sender to suspend", || waiting(&queues, q) == 2);

    assert_eq!(take(&queues, q), vec![7, 7]);
    assert_eq!(urgent.join().unwrap(), Ok(()));
    assert_eq!(take(&queues, q), vec![1, 1]);
    assert_eq!(normal.join().unwrap(), Ok(()));
    assert_eq!(take(&queues, q), vec![2, 2]);
    assert_eq!(take(&queues, q), vec![3, 3]);
}

#[test]
fn test_variable_queue_keeps_pending_sender_ahead() {
    let (kernel, scheduler) = boot();
    let queues = kernel.queues();
    let q = queue(&queues, 10, MessageType::Variable, 4, SuspendPolicy::Fifo);

    queues.send(q, &[1, 1, 1, 1], Suspend::NoSuspend).unwrap();
    queues.send(q, &[2, 2], Suspend::NoSuspend).unwrap();
    assert_eq!(queues.information(q).unwrap().available, 2);

    let pending = spawn_sender(&scheduler, &queues, q, vec![3, 3, 3, 3], false);
    eventually("long sender to suspend", || waiting(&queues, q) == 1);

    // One word plus its length would fit, but the pending sender goes first.
    assert_eq!(
        queues.send(q, &[9], Suspend::NoSuspend),
        Err(QueueError::QueueFull)
    );

    assert_eq!(take(&queues, q), vec![1, 1, 1, 1]);
    assert_eq!(pending.join().unwrap(), Ok(()));
    assert_eq!(take(&queues, q), vec![2, 2]);
    assert_eq!(take(&queues, q), vec![3, 3, 3, 3]);
}

#[test]
fn test_only_a_more_urgent_sender_may_pass_pending_ones() {
    let (kernel, scheduler) = boot();
    let queues = kernel.queues();
    let q = queue(&queues, 10, MessageType::Variable, 4, SuspendPolicy::Priority);

    queues.send(q, &[1, 1, 1, 1], Suspend::NoSuspend).unwrap();
    queues.send(q, &[2, 2], Suspend::NoSuspend).unwrap();
    let pending = spawn_sender(&scheduler, &queues, q, vec![3, 3, 3, 3], false);
    eventually("long sender to suspend", || waiting(&queues, q) == 1);

    let me = scheduler.register_current("main", Some(40));
    assert_eq!(
        queues.send(q, &[9], Suspend::Timeout(Duration::from_millis(20))),
        Err(QueueError::Timeout)
    );
    assert_eq!(waiting(&queues, q), 1);

    scheduler.set_priority(me, 10);
    queues.send(q, &[9], Suspend::Forever).unwrap();
    assert_eq!(queues.information(q).unwrap().available, 0);

    assert_eq!(take(&queues, q), vec![1, 1, 1, 1]);
    assert_eq!(pending.join().unwrap(), Ok(()));
    scheduler.unregister_current();
}

#[test]
fn test_reset_releases_receivers() {
    let (kernel, scheduler) = boot();
    let queues = kernel.queues();
    let q = queue(&queues, 8, MessageType::Fixed, 2, SuspendPolicy::Priority);

    let receivers: Vec<_> = (0..2).map(|_| spawn_receiver(&scheduler, &queues, q)).collect();
    eventually("receivers to suspend", || waiting(&queues, q) == 2);

    queues.reset(q).unwrap();
    for receiver in receivers {
        assert_eq!(receiver.join().unwrap(), Err(QueueError::QueueReset));
    }
    let info = queues.information(q).unwrap();
    assert_eq!(info.tasks_waiting, 0);
    assert_eq!(info.first_task, None);
}

#[test]
fn test_delete_releases_both_sender_lists() {
    let (kernel, scheduler) = boot();
    let queues = kernel.queues();
    let q = queue(&queues, 2, MessageType::Fixed, 2, SuspendPolicy::Fifo);
    queues.send(q, &[1, 1], Suspend::NoSuspend).unwrap();

    let normal = spawn_sender(&scheduler, &queues, q, vec![2, 2], false);
    let urgent = spawn_sender(&scheduler, &queues, q, vec![3, 3], true);
    eventually("senders to suspend", || waiting(&queues, q) == 2);

    queues.delete(q).unwrap();
    assert_eq!(normal.join().unwrap(), Err(QueueError::QueueDeleted));
    assert_eq!(urgent.join().unwrap(), Err(QueueError::QueueDeleted));
}

#[test]
#[serial]
fn test_receive_times_out() {
    let (kernel, scheduler) = boot();
    let queues = kernel.queues();
    let q = queue(&queues, 4, MessageType::Fixed, 2, SuspendPolicy::Fifo);

    scheduler.register_current("main", None);
    let mut dest = [0; 2];
    assert_eq!(
        queues.receive(q, &mut dest, Suspend::Timeout(Duration::from_millis(20))),
        Err(QueueError::Timeout)
    );
    scheduler.unregister_current();
    assert_eq!(waiting(&queues, q), 0);
}
