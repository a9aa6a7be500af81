/*!
 * Pipe Tests
 * Byte messages, word padding, urgent sends, hand-off and forced wakes
 */

use crate::support::{boot, eventually};
use pretty_assertions::assert_eq;
use rtos_kernel::ipc::{PipeError, PipeHandle, PipeManager};
use rtos_kernel::scheduler::TaskHandle;
use rtos_kernel::{KernelError, MessageType, Suspend, SuspendPolicy, ThreadScheduler};
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;

fn pipe(pipes: &PipeManager, bytes: usize, kind: MessageType, size: usize) -> PipeHandle {
    pipes
        .create("pipe", vec![0; bytes].into_boxed_slice(), kind, size, SuspendPolicy::Fifo)
        .unwrap()
}

fn take(pipes: &PipeManager, pipe: PipeHandle) -> Vec<u8> {
    let mut dest = [0; 32];
    let len = pipes.receive(pipe, &mut dest, Suspend::NoSuspend).unwrap();
    dest[..len].to_vec()
}

fn waiting(pipes: &PipeManager, pipe: PipeHandle) -> usize {
    pipes.information(pipe).unwrap().tasks_waiting
}

fn spawn_receiver(
    scheduler: &Arc<ThreadScheduler>,
    pipes: &PipeManager,
    pipe: PipeHandle,
) -> TaskHandle<Result<Vec<u8>, PipeError>> {
    let pipes = pipes.clone();
    scheduler
        .spawn_task("rx", 40, move || {
            let mut dest = [0; 32];
            let len = pipes.receive(pipe, &mut dest, Suspend::Forever)?;
            Ok(dest[..len].to_vec())
        })
        .unwrap()
}

#[test]
fn test_variable_messages_are_padded_to_words() {
    let (kernel, _scheduler) = boot();
    let pipes = kernel.pipes();
    let p = pipe(&pipes, 32, MessageType::Variable, 10);

    pipes.send(p, b"hello", Suspend::NoSuspend).unwrap();
    pipes.send(p, b"hi", Suspend::NoSuspend).unwrap();

    // Length word plus payload rounded up to whole words.
    let info = pipes.information(p).unwrap();
    assert_eq!(info.pipe_size, 32);
    assert_eq!(info.messages, 2);
    assert_eq!(info.available, 32 - (4 + 8) - (4 + 4));

    assert_eq!(take(&pipes, p), b"hello".to_vec());
    assert_eq!(take(&pipes, p), b"hi".to_vec());
    assert_eq!(pipes.information(p).unwrap().available, 32);
    assert_eq!(
        pipes.receive(p, &mut [0; 10], Suspend::NoSuspend),
        Err(PipeError::PipeEmpty)
    );
}

#[test]
fn test_variable_messages_wrap_around_the_buffer() {
    let (kernel, _scheduler) = boot();
    let pipes = kernel.pipes();
    let p = pipe(&pipes, 20, MessageType::Variable, 12);

    for round in 0..10u8 {
        let message: Vec<u8> = (0..=round % 12).map(|i| round.wrapping_mul(7) ^ i).collect();
        pipes.send(p, &message, Suspend::NoSuspend).unwrap();
        assert_eq!(take(&pipes, p), message);
    }
    assert_eq!(pipes.information(p).unwrap().available, 20);
}

#[test]
fn test_fixed_pipe_uses_whole_slots() {
    let (kernel, _scheduler) = boot();
    let pipes = kernel.pipes();
    let p = pipe(&pipes, 10, MessageType::Fixed, 3);
    assert_eq!(pipes.information(p).unwrap().pipe_size, 9);

    for message in [b"abc", b"def", b"ghi"] {
        pipes.send(p, message, Suspend::NoSuspend).unwrap();
    }
    assert_eq!(pipes.send(p, b"jkl", Suspend::NoSuspend), Err(PipeError::PipeFull));
    assert_eq!(pipes.send(p, b"ab", Suspend::NoSuspend), Err(PipeError::InvalidSize));
    assert_eq!(
        pipes.receive(p, &mut [0; 2], Suspend::NoSuspend),
        Err(PipeError::InvalidSize)
    );

    assert_eq!(take(&pipes, p), b"abc".to_vec());
    assert_eq!(take(&pipes, p), b"def".to_vec());
    assert_eq!(take(&pipes, p), b"ghi".to_vec());
}

#[test]
fn test_send_to_front_keeps_urgent_order() {
    let (kernel, _scheduler) = boot();
    let pipes = kernel.pipes();
    let p = pipe(&pipes, 64, MessageType::Variable, 8);

    pipes.send(p, b"one", Suspend::NoSuspend).unwrap();
    pipes.send(p, b"two", Suspend::NoSuspend).unwrap();
    pipes.send_to_front(p, b"u1", Suspend::NoSuspend).unwrap();
    pipes.send_to_front(p, b"u2", Suspend::NoSuspend).unwrap();

    assert_eq!(take(&pipes, p), b"u1".to_vec());
    assert_eq!(take(&pipes, p), b"u2".to_vec());
    assert_eq!(take(&pipes, p), b"one".to_vec());
    assert_eq!(take(&pipes, p), b"two".to_vec());
}

#[test]
fn test_create_validation() {
    let (kernel, _scheduler) = boot();
    let pipes = kernel.pipes();

    let create = |bytes: usize, kind: MessageType, size: usize| {
        pipes.create("bad", vec![0; bytes].into_boxed_slice(), kind, size, SuspendPolicy::Fifo)
    };
    assert_eq!(create(0, MessageType::Fixed, 1), Err(PipeError::InvalidSize));
    assert_eq!(create(8, MessageType::Fixed, 0), Err(PipeError::InvalidSize));
    assert_eq!(create(8, MessageType::Fixed, 9), Err(PipeError::InvalidSize));
    // A 5-byte message needs a length word and 8 padded bytes.
    assert_eq!(create(8, MessageType::Variable, 5), Err(PipeError::InvalidSize));
    assert_eq!(create(8, MessageType::Variable, usize::MAX), Err(PipeError::InvalidSize));
    assert_eq!(pipes.established(), 0);

    assert!(create(8, MessageType::Variable, 4).is_ok());
    assert_eq!(
        "stream".parse::<MessageType>().map_err(PipeError::from),
        Err(PipeError::InvalidMessage)
    );
}

#[test]
fn test_handles_and_information() {
    let (kernel, _scheduler) = boot();
    let pipes = kernel.pipes();
    let handles: Vec<_> = (0..3)
        .map(|_| pipe(&pipes, 16, MessageType::Variable, 4))
        .collect();

    assert_eq!(pipes.established(), 3);
    assert_eq!(pipes.pipe_handles(2), handles[..2].to_vec());
    assert_eq!(pipes.pipe_handles(8), handles);

    let info = pipes.information(handles[1]).unwrap();
    assert_eq!(info.name.as_str(), "pipe");
    assert_eq!(info.message_type, MessageType::Variable);
    assert_eq!(info.message_size, 4);
    assert_eq!(info.suspend_policy, SuspendPolicy::Fifo);
    assert_eq!(info.tasks_waiting, 0);
    assert_eq!(info.first_task, None);
}

#[test]
fn test_send_and_broadcast_hand_off_directly() {
    let (kernel, scheduler) = boot();
    let pipes = kernel.pipes();
    let p = pipe(&pipes, 16, MessageType::Variable, 8);

    let receiver = spawn_receiver(&scheduler, &pipes, p);
    eventually("receiver to suspend", || waiting(&pipes, p) == 1);
    pipes.send(p, b"direct", Suspend::NoSuspend).unwrap();
    assert_eq!(receiver.join().unwrap(), Ok(b"direct".to_vec()));

    let receivers: Vec<_> = (0..3).map(|_| spawn_receiver(&scheduler, &pipes, p)).collect();
    eventually("receivers to suspend", || waiting(&pipes, p) == 3);
    assert_eq!(pipes.broadcast(p, b"all", Suspend::NoSuspend), Ok(3));
    for receiver in receivers {
        assert_eq!(receiver.join().unwrap(), Ok(b"all".to_vec()));
    }

    // Nothing touched the buffer; with nobody waiting broadcast buffers.
    assert_eq!(pipes.information(p).unwrap().available, 16);
    assert_eq!(pipes.broadcast(p, b"late", Suspend::NoSuspend), Ok(0));
    assert_eq!(take(&pipes, p), b"late".to_vec());
}

#[test]
fn test_receive_promotes_suspended_sender() {
    let (kernel, scheduler) = boot();
    let pipes = kernel.pipes();
    let p = pipe(&pipes, 4, MessageType::Fixed, 4);
    pipes.send(p, &[1, 2, 3, 4], Suspend::NoSuspend).unwrap();

    let sender = {
        let pipes = pipes.clone();
        scheduler
            .spawn_task("tx", 40, move || pipes.send(p, &[5, 6, 7, 8], Suspend::Forever))
            .unwrap()
    };
    eventually("sender to suspend", || waiting(&pipes, p) == 1);

    assert_eq!(take(&pipes, p), vec![1, 2, 3, 4]);
    assert_eq!(sender.join().unwrap(), Ok(()));
    assert_eq!(take(&pipes, p), vec![5, 6, 7, 8]);
}

#[test]
fn test_reset_and_delete_release_waiters() {
    let (kernel, scheduler) = boot();
    let pipes = kernel.pipes();
    let p = pipe(&pipes, 4, MessageType::Fixed, 4);

    let receiver = spawn_receiver(&scheduler, &pipes, p);
    eventually("receiver to suspend", || waiting(&pipes, p) == 1);
    pipes.reset(p).unwrap();
    assert_eq!(receiver.join().unwrap(), Err(PipeError::PipeReset));

    pipes.send(p, &[1, 1, 1, 1], Suspend::NoSuspend).unwrap();
    let urgent = {
        let pipes = pipes.clone();
        scheduler
            .spawn_task("tx", 40, move || pipes.send_to_front(p, &[2; 4], Suspend::Forever))
            .unwrap()
    };
    eventually("urgent sender to suspend", || waiting(&pipes, p) == 1);

    let buffer = pipes.delete(p).unwrap();
    assert_eq!(urgent.join().unwrap(), Err(PipeError::PipeDeleted));
    assert_eq!(&buffer[..], &[1, 1, 1, 1]);

    assert_eq!(pipes.information(p), Err(PipeError::InvalidPipe));
    assert!(pipes.pipe_handles(4).is_empty());
}

#[test]
fn test_stale_handle_outranks_suspension_check() {
    let (kernel, _scheduler) = boot();
    let pipes = kernel.pipes();
    let p = pipe(&pipes, 8, MessageType::Variable, 4);
    pipes.delete(p).unwrap();

    assert_eq!(pipes.send(p, b"x", Suspend::Forever), Err(PipeError::InvalidPipe));
    assert_eq!(
        pipes.receive(p, &mut [0; 4], Suspend::Forever),
        Err(PipeError::InvalidPipe)
    );
}

#[test]
#[serial]
fn test_receive_times_out() {
    let (kernel, scheduler) = boot();
    let pipes = kernel.pipes();
    let p = pipe(&pipes, 8, MessageType::Variable, 4);

    scheduler.register_current("main", None);
    let result = pipes.receive(p, &mut [0; 4], Suspend::Timeout(Duration::from_millis(20)));
    scheduler.unregister_current();

    assert_eq!(result, Err(PipeError::Timeout));
    assert!(KernelError::from(PipeError::Timeout).is_timeout());
    assert_eq!(waiting(&pipes, p), 0);
}
