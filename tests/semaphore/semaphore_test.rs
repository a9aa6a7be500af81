/*!
 * Counting Semaphore Tests
 */

use crate::support::{boot, eventually};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use rtos_kernel::semaphore::{SemaphoreError, SemaphoreHandle};
use rtos_kernel::{SemaphoreManager, Suspend, SuspendPolicy};
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;

fn count(semaphores: &SemaphoreManager, handle: SemaphoreHandle) -> u32 {
    semaphores.information(handle).unwrap().current_count
}

fn waiting(semaphores: &SemaphoreManager, handle: SemaphoreHandle) -> usize {
    semaphores.information(handle).unwrap().tasks_waiting
}

#[test]
fn test_obtain_and_release_track_the_count() {
    let (kernel, _scheduler) = boot();
    let semaphores = kernel.semaphores();
    let sem = semaphores.create("slots", 2, SuspendPolicy::Fifo).unwrap();

    semaphores.obtain(sem, Suspend::NoSuspend).unwrap();
    semaphores.obtain(sem, Suspend::NoSuspend).unwrap();
    assert_eq!(count(&semaphores, sem), 0);
    assert_eq!(
        semaphores.obtain(sem, Suspend::NoSuspend),
        Err(SemaphoreError::Unavailable)
    );

    semaphores.release(sem).unwrap();
    assert_eq!(count(&semaphores, sem), 1);
}

#[test]
fn test_release_at_maximum_rolls_over() {
    let (kernel, _scheduler) = boot();
    let semaphores = kernel.semaphores();
    let sem = semaphores.create("full", u32::MAX, SuspendPolicy::Fifo).unwrap();

    assert_eq!(semaphores.release(sem), Err(SemaphoreError::CountRollover));
    assert_eq!(count(&semaphores, sem), u32::MAX);
}

#[test]
fn test_release_hands_count_to_most_urgent_waiter() {
    let (kernel, scheduler) = boot();
    let semaphores = kernel.semaphores();
    let sem = semaphores.create("prio", 0, SuspendPolicy::Priority).unwrap();
    let order = Arc::new(Mutex::new(Vec::new()));

    let tasks: Vec<_> = [40u8, 10, 25]
        .into_iter()
        .enumerate()
        .map(|(n, priority)| {
            let task_semaphores = semaphores.clone();
            let order = Arc::clone(&order);
            let task = scheduler
                .spawn_task("sem", priority, move || {
                    let result = task_semaphores.obtain(sem, Suspend::Forever);
                    order.lock().push(priority);
                    result
                })
                .unwrap();
            eventually("obtain to suspend", || waiting(&semaphores, sem) == n + 1);
            task
        })
        .collect();

    for released in 1..=3 {
        semaphores.release(sem).unwrap();
        eventually("woken task to record", || order.lock().len() == released);
    }

    for task in tasks {
        assert_eq!(task.join().unwrap(), Ok(()));
    }
    assert_eq!(*order.lock(), vec![10, 25, 40]);
    assert_eq!(count(&semaphores, sem), 0);
}

#[test]
fn test_reset_and_delete_release_waiters() {
    let (kernel, scheduler) = boot();
    let semaphores = kernel.semaphores();
    let sem = semaphores.create("life", 0, SuspendPolicy::Fifo).unwrap();

    let spawn_waiter = || {
        let semaphores = semaphores.clone();
        scheduler
            .spawn_task("sem", 20, move || semaphores.obtain(sem, Suspend::Forever))
            .unwrap()
    };

    let first = spawn_waiter();
    eventually("first waiter to suspend", || waiting(&semaphores, sem) == 1);
    semaphores.reset(sem, 3).unwrap();
    assert_eq!(first.join().unwrap(), Err(SemaphoreError::SemaphoreReset));
    assert_eq!(count(&semaphores, sem), 3);

    semaphores.reset(sem, 0).unwrap();
    let second = spawn_waiter();
    eventually("second waiter to suspend", || waiting(&semaphores, sem) == 1);
    semaphores.delete(sem).unwrap();
    assert_eq!(second.join().unwrap(), Err(SemaphoreError::SemaphoreDeleted));

    assert_eq!(
        semaphores.information(sem),
        Err(SemaphoreError::InvalidSemaphore)
    );
    assert!(semaphores.semaphore_handles(4).is_empty());
}

#[test]
#[serial]
fn test_obtain_times_out() {
    let (kernel, scheduler) = boot();
    let semaphores = kernel.semaphores();
    let sem = semaphores.create("late", 0, SuspendPolicy::Fifo).unwrap();

    scheduler.register_current("main", None);
    let result = semaphores.obtain(sem, Suspend::Timeout(Duration::from_millis(20)));
    scheduler.unregister_current();

    assert_eq!(result, Err(SemaphoreError::Timeout));
    assert_eq!(waiting(&semaphores, sem), 0);
    assert_eq!(semaphores.established(), 1);
}

#[test]
fn test_stale_handle_outranks_suspension_check() {
    let (kernel, _scheduler) = boot();
    let semaphores = kernel.semaphores();
    let live = semaphores.create("live", 0, SuspendPolicy::Fifo).unwrap();
    let stale = semaphores.create("stale", 0, SuspendPolicy::Fifo).unwrap();
    semaphores.delete(stale).unwrap();

    assert_eq!(
        semaphores.obtain(live, Suspend::Forever),
        Err(SemaphoreError::InvalidSuspend)
    );
    assert_eq!(
        semaphores.obtain(stale, Suspend::Forever),
        Err(SemaphoreError::InvalidSemaphore)
    );
}
