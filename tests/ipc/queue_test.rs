/*!
 * Queue Tests
 * Ordering, sizing and lifecycle without blocking
 */

use crate::support::boot;
use pretty_assertions::assert_eq;
use rtos_kernel::ipc::{QueueError, QueueHandle, QueueManager};
use rtos_kernel::{MessageType, Suspend, SuspendPolicy, Word};

fn fixed_queue(queues: &QueueManager, words: usize, message_size: usize) -> QueueHandle {
    queues
        .create(
            "fixed",
            vec![0; words].into_boxed_slice(),
            MessageType::Fixed,
            message_size,
            SuspendPolicy::Fifo,
        )
        .unwrap()
}

fn take(queues: &QueueManager, queue: QueueHandle) -> Vec<Word> {
    let mut dest = [0; 8];
    let len = queues.receive(queue, &mut dest, Suspend::NoSuspend).unwrap();
    dest[..len].to_vec()
}

#[test]
fn test_fixed_queue_scenario() {
    let (kernel, _scheduler) = boot();
    let queues = kernel.queues();
    let queue = fixed_queue(&queues, 10, 2);

    queues.send(queue, &[1, 2], Suspend::NoSuspend).unwrap();
    queues.send(queue, &[3, 4], Suspend::NoSuspend).unwrap();
    assert_eq!(take(&queues, queue), vec![1, 2]);
    assert_eq!(take(&queues, queue), vec![3, 4]);

    let mut dest = [0; 2];
    assert_eq!(
        queues.receive(queue, &mut dest, Suspend::NoSuspend),
        Err(QueueError::QueueEmpty)
    );
}

#[test]
fn test_fifo_order_survives_wraparound() {
    let (kernel, _scheduler) = boot();
    let queues = kernel.queues();
    let queue = fixed_queue(&queues, 6, 2);

    let mut expected = Vec::new();
    let mut received = Vec::new();
    for round in 0..10u32 {
        if queues.information(queue).unwrap().messages == 3 {
            received.push(take(&queues, queue));
        }
        queues.send(queue, &[round, round + 100], Suspend::NoSuspend).unwrap();
        expected.push(vec![round, round + 100]);
    }
    while queues.information(queue).unwrap().messages > 0 {
        received.push(take(&queues, queue));
    }
    assert_eq!(received, expected);
}

#[test]
fn test_send_to_front_ordering() {
    let (kernel, _scheduler) = boot();
    let queues = kernel.queues();
    let queue = fixed_queue(&queues, 10, 2);

    queues.send(queue, &[1, 1], Suspend::NoSuspend).unwrap();
    queues.send(queue, &[2, 2], Suspend::NoSuspend).unwrap();
    queues.send_to_front(queue, &[7, 7], Suspend::NoSuspend).unwrap();
    queues.send_to_front(queue, &[8, 8], Suspend::NoSuspend).unwrap();
    queues.send(queue, &[3, 3], Suspend::NoSuspend).unwrap();

    let order: Vec<_> = (0..5).map(|_| take(&queues, queue)).collect();
    assert_eq!(
        order,
        vec![vec![7, 7], vec![8, 8], vec![1, 1], vec![2, 2], vec![3, 3]]
    );
}

#[test]
fn test_full_queue_rejects_without_suspension() {
    let (kernel, _scheduler) = boot();
    let queues = kernel.queues();
    // Seven words hold three two-word messages; the last word is unused.
    let queue = fixed_queue(&queues, 7, 2);
    assert_eq!(queues.information(queue).unwrap().queue_size, 6);

    for i in 0..3 {
        queues.send(queue, &[i, i], Suspend::NoSuspend).unwrap();
    }
    assert_eq!(
        queues.send(queue, &[9, 9], Suspend::NoSuspend),
        Err(QueueError::QueueFull)
    );
    assert_eq!(
        queues.send_to_front(queue, &[9, 9], Suspend::NoSuspend),
        Err(QueueError::QueueFull)
    );

    let info = queues.information(queue).unwrap();
    assert_eq!(info.available, 0);
    assert_eq!(info.messages, 3);
}

#[test]
fn test_variable_messages() {
    let (kernel, _scheduler) = boot();
    let queues = kernel.queues();
    let queue = queues
        .create(
            "var",
            vec![0; 12].into_boxed_slice(),
            "variable".parse().unwrap(),
            4,
            SuspendPolicy::Fifo,
        )
        .unwrap();

    queues.send(queue, &[1], Suspend::NoSuspend).unwrap();
    queues.send(queue, &[2, 2, 2, 2], Suspend::NoSuspend).unwrap();
    queues.send_to_front(queue, &[3, 3], Suspend::NoSuspend).unwrap();
    assert_eq!(queues.information(queue).unwrap().available, 12 - 2 - 5 - 3);

    assert_eq!(take(&queues, queue), vec![3, 3]);
    assert_eq!(take(&queues, queue), vec![1]);
    assert_eq!(take(&queues, queue), vec![2, 2, 2, 2]);
    assert_eq!(queues.information(queue).unwrap().available, 12);
}

#[test]
fn test_size_validation() {
    let (kernel, _scheduler) = boot();
    let queues = kernel.queues();

    let create = |words: usize, kind: MessageType, size: usize| {
        queues.create("bad", vec![0; words].into_boxed_slice(), kind, size, SuspendPolicy::Fifo)
    };
    assert_eq!(create(0, MessageType::Fixed, 1), Err(QueueError::InvalidSize));
    assert_eq!(create(4, MessageType::Fixed, 0), Err(QueueError::InvalidSize));
    assert_eq!(create(4, MessageType::Fixed, 5), Err(QueueError::InvalidSize));
    assert_eq!(create(4, MessageType::Variable, 4), Err(QueueError::InvalidSize));
    assert_eq!(create(4, MessageType::Variable, usize::MAX), Err(QueueError::InvalidSize));
    assert_eq!(
        "ring".parse::<MessageType>().map_err(QueueError::from),
        Err(QueueError::InvalidMessage)
    );

    let fixed = fixed_queue(&queues, 8, 2);
    assert_eq!(
        queues.send(fixed, &[1], Suspend::NoSuspend),
        Err(QueueError::InvalidSize)
    );
    let mut small = [0; 1];
    assert_eq!(
        queues.receive(fixed, &mut small, Suspend::NoSuspend),
        Err(QueueError::InvalidSize)
    );

    let variable = create(8, MessageType::Variable, 3).unwrap();
    assert_eq!(
        queues.send(variable, &[], Suspend::NoSuspend),
        Err(QueueError::InvalidSize)
    );
    assert_eq!(
        queues.send(variable, &[1, 2, 3, 4], Suspend::NoSuspend),
        Err(QueueError::InvalidSize)
    );
}

#[test]
fn test_reset_and_delete() {
    let (kernel, _scheduler) = boot();
    let queues = kernel.queues();
    let queue = fixed_queue(&queues, 8, 2);

    queues.send(queue, &[5, 6], Suspend::NoSuspend).unwrap();
    queues.reset(queue).unwrap();
    let info = queues.information(queue).unwrap();
    assert_eq!(info.messages, 0);
    assert_eq!(info.available, 8);

    queues.send(queue, &[7, 8], Suspend::NoSuspend).unwrap();
    let buffer = queues.delete(queue).unwrap();
    assert_eq!(buffer.len(), 8);
    assert_eq!(&buffer[..2], &[7, 8]);

    assert_eq!(queues.information(queue), Err(QueueError::InvalidQueue));
    assert_eq!(
        queues.send(queue, &[1, 1], Suspend::NoSuspend),
        Err(QueueError::InvalidQueue)
    );
    assert_eq!(queues.established(), 0);
}

#[test]
fn test_suspension_needs_a_task() {
    let (kernel, _scheduler) = boot();
    let queues = kernel.queues();
    let queue = fixed_queue(&queues, 4, 2);

    let mut dest = [0; 2];
    assert_eq!(
        queues.receive(queue, &mut dest, Suspend::Forever),
        Err(QueueError::InvalidSuspend)
    );
}

#[test]
fn test_stale_handle_outranks_suspension_check() {
    let (kernel, _scheduler) = boot();
    let queues = kernel.queues();
    let queue = fixed_queue(&queues, 4, 2);
    queues.delete(queue).unwrap();

    let mut dest = [0; 2];
    assert_eq!(
        queues.receive(queue, &mut dest, Suspend::Forever),
        Err(QueueError::InvalidQueue)
    );
    assert_eq!(
        queues.send_to_front(queue, &[1, 2], Suspend::Forever),
        Err(QueueError::InvalidQueue)
    );
}
