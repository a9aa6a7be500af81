/*!
 * Memory Pool Blocking Tests
 * Suspended allocations served by deallocation, timeouts and deletion
 */

use crate::support::{boot, eventually};
use pretty_assertions::assert_eq;
use rtos_kernel::memory::PoolError;
use rtos_kernel::{MemoryRegion, Suspend, SuspendPolicy};
use serial_test::serial;
use std::time::Duration;

#[test]
fn test_deallocate_serves_suspended_request() {
    let (kernel, scheduler) = boot();
    let pools = kernel.memory_pools();
    let pool = pools
        .create("serve", MemoryRegion::new(0x1000, 256), 16, SuspendPolicy::Fifo)
        .unwrap();
    let hog = pools.allocate(pool, 200, Suspend::NoSuspend).unwrap();

    let waiter = {
        let pools = pools.clone();
        scheduler
            .spawn_task("alloc", 20, move || pools.allocate(pool, 64, Suspend::Forever))
            .unwrap()
    };
    eventually("allocation to suspend", || {
        pools.information(pool).unwrap().tasks_waiting == 1
    });
    assert_eq!(
        pools.information(pool).unwrap().first_task,
        Some(waiter.id())
    );

    pools.deallocate(hog).unwrap();
    let granted = waiter.join().unwrap().unwrap();
    assert_eq!(granted, hog);
    assert_eq!(pools.information(pool).unwrap().tasks_waiting, 0);
}

#[test]
#[serial]
fn test_suspended_allocation_times_out() {
    let (kernel, scheduler) = boot();
    let pools = kernel.memory_pools();
    let pool = pools
        .create("timeout", MemoryRegion::new(0x1000, 256), 16, SuspendPolicy::Fifo)
        .unwrap();
    pools.allocate(pool, 200, Suspend::NoSuspend).unwrap();

    scheduler.register_current("test", None);
    let result = pools.allocate(pool, 64, Suspend::Timeout(Duration::from_millis(30)));
    scheduler.unregister_current();

    assert_eq!(result, Err(PoolError::Timeout));
    assert_eq!(pools.information(pool).unwrap().tasks_waiting, 0);
}

#[test]
fn test_delete_releases_every_waiter() {
    let (kernel, scheduler) = boot();
    let pools = kernel.memory_pools();
    let pool = pools
        .create("doomed", MemoryRegion::new(0x1000, 256), 16, SuspendPolicy::Priority)
        .unwrap();
    pools.allocate(pool, 200, Suspend::NoSuspend).unwrap();

    let waiters: Vec<_> = (0..3)
        .map(|i| {
            let pools = pools.clone();
            scheduler
                .spawn_task("alloc", 10 + i, move || pools.allocate(pool, 64, Suspend::Forever))
                .unwrap()
        })
        .collect();
    eventually("three allocations to suspend", || {
        pools.information(pool).unwrap().tasks_waiting == 3
    });

    pools.delete(pool).unwrap();
    for waiter in waiters {
        assert_eq!(waiter.join().unwrap(), Err(PoolError::PoolDeleted));
    }
    assert_eq!(pools.established(), 0);
}

#[test]
fn test_deallocate_serves_waiters_while_they_fit() {
    let (kernel, scheduler) = boot();
    let pools = kernel.memory_pools();
    let pool = pools
        .create("order", MemoryRegion::new(0x1000, 512), 16, SuspendPolicy::Fifo)
        .unwrap();
    let whole = pools.allocate(pool, 464, Suspend::NoSuspend).unwrap();

    let big = {
        let pools = pools.clone();
        scheduler
            .spawn_task("big", 50, move || pools.allocate(pool, 400, Suspend::Forever))
            .unwrap()
    };
    eventually("big request to suspend", || {
        pools.information(pool).unwrap().tasks_waiting == 1
    });
    let small = {
        let pools = pools.clone();
        scheduler
            .spawn_task("small", 50, move || pools.allocate(pool, 16, Suspend::Forever))
            .unwrap()
    };
    eventually("small request to suspend", || {
        pools.information(pool).unwrap().tasks_waiting == 2
    });

    pools.deallocate(whole).unwrap();
    assert!(big.join().unwrap().is_ok());
    assert!(small.join().unwrap().is_ok());
}
