/*!
 * RTOS Kernel - Demo Entry Point
 *
 * Boots a kernel on the thread scheduler and runs a producer/consumer
 * pair through a queue, a mailbox and an event group, then echoes a
 * line through a pipe.
 */

use anyhow::{Context, Result};
use rtos_kernel::{
    init_tracing, EventOperation, Kernel, KernelConfig, MemoryRegion, MessageType, SetOperation,
    Suspend, SuspendPolicy, ThreadScheduler,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const DONE: u32 = 0x1;

fn main() -> Result<()> {
    let config = KernelConfig::from_env()?;
    init_tracing(&config).context("installing tracing subscriber")?;

    info!("RTOS kernel starting...");
    let scheduler = Arc::new(ThreadScheduler::with_config(&config));
    let kernel = Kernel::with_config(scheduler.clone(), config);
    scheduler.register_current("main", None);

    let pools = kernel.memory_pools();
    let pool = pools.create("heap", MemoryRegion::new(0x1000, 4096), 16, SuspendPolicy::Fifo)?;
    let block = pools.allocate(pool, 300, Suspend::NoSuspend)?;
    info!(address = block, "allocated 300 bytes");
    pools.deallocate(block)?;

    let queues = kernel.queues();
    let queue = queues.create(
        "work",
        vec![0; 16].into_boxed_slice(),
        MessageType::Variable,
        4,
        SuspendPolicy::Priority,
    )?;
    let mailboxes = kernel.mailboxes();
    let mailbox = mailboxes.create("reply", SuspendPolicy::Fifo)?;
    let groups = kernel.event_groups();
    let group = groups.create("status")?;

    let consumer = {
        let queues = queues.clone();
        let mailboxes = mailboxes.clone();
        let groups = groups.clone();
        scheduler.spawn_task("consumer", 64, move || -> Result<u32> {
            let mut sum = 0;
            let mut dest = [0; 4];
            for _ in 0..3 {
                let len = queues.receive(queue, &mut dest, Suspend::Forever)?;
                sum += dest[..len].iter().sum::<u32>();
            }
            mailboxes.send(mailbox, [sum, 0, 0, 0], Suspend::Forever)?;
            groups.set_events(group, DONE, SetOperation::Or)?;
            Ok(sum)
        })?
    };

    queues.send(queue, &[1, 2], Suspend::Forever)?;
    queues.send(queue, &[3], Suspend::Forever)?;
    queues.send_to_front(queue, &[10, 20, 30], Suspend::Forever)?;

    let reply = mailboxes.receive(mailbox, Suspend::Timeout(Duration::from_secs(5)))?;
    let events = groups.retrieve_events(
        group,
        DONE,
        EventOperation::AndConsume,
        Suspend::Timeout(Duration::from_secs(5)),
    )?;
    info!(sum = reply[0], events, "consumer finished");

    let pipes = kernel.pipes();
    let pipe = pipes.create(
        "log",
        vec![0; 64].into_boxed_slice(),
        MessageType::Variable,
        32,
        SuspendPolicy::Fifo,
    )?;
    pipes.send(pipe, b"consumer done", Suspend::NoSuspend)?;
    let mut line = [0; 32];
    let len = pipes.receive(pipe, &mut line, Suspend::NoSuspend)?;
    info!(line = %String::from_utf8_lossy(&line[..len]), "pipe echo");
    pipes.delete(pipe)?;

    match consumer.join() {
        Ok(result) => {
            result?;
        }
        Err(_) => anyhow::bail!("consumer task panicked"),
    }

    info!(?kernel, "RTOS kernel shutting down");
    scheduler.unregister_current();
    Ok(())
}
