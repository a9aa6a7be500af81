/*!
 * Shared helpers for integration tests
 */

#![allow(dead_code)]

use rtos_kernel::{Kernel, KernelConfig, ThreadScheduler};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Upper bound for anything a test waits on
pub const PATIENCE: Duration = Duration::from_secs(5);

/// A kernel on a fresh thread scheduler
pub fn boot() -> (Kernel, Arc<ThreadScheduler>) {
    let scheduler = Arc::new(ThreadScheduler::new());
    let kernel = Kernel::with_config(scheduler.clone(), KernelConfig::quiet());
    (kernel, scheduler)
}

/// Poll `check` until it holds, failing the test after `PATIENCE`
pub fn eventually(what: &str, mut check: impl FnMut() -> bool) {
    let deadline = Instant::now() + PATIENCE;
    while !check() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        thread::sleep(Duration::from_millis(1));
    }
}
