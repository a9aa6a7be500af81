/*!
 * Kernel
 *
 * One lock guards every control block. Each object manager is a thin
 * facade over a shared `Kernel` handle; operations take the lock, mutate
 * the control block, and release the lock before returning (blocking
 * calls hand it to the scheduler for the duration of the suspension).
 */

use crate::core::config::KernelConfig;
use crate::core::data_structures::InlineString;
use crate::events::{EventGroup, EventGroupManager};
use crate::ipc::mailbox::{Mailbox, MailboxManager};
use crate::ipc::pipe::{Pipe, PipeManager};
use crate::ipc::queue::{Queue, QueueManager};
use crate::memory::{MemoryPool, MemoryPoolManager};
use crate::partition::{PartitionManager, PartitionPool};
use crate::registry::Registry;
use crate::scheduler::Scheduler;
use crate::semaphore::{Semaphore, SemaphoreManager};
use crate::suspend::WaitId;
use log::info;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Every control block in the system
pub struct KernelState {
    pub(crate) pools: Registry<MemoryPool>,
    pub(crate) partitions: Registry<PartitionPool>,
    pub(crate) queues: Registry<Queue>,
    pub(crate) pipes: Registry<Pipe>,
    pub(crate) mailboxes: Registry<Mailbox>,
    pub(crate) groups: Registry<EventGroup>,
    pub(crate) semaphores: Registry<Semaphore>,
    next_wait: WaitId,
}

impl KernelState {
    fn new() -> Self {
        Self {
            pools: Registry::new(),
            partitions: Registry::new(),
            queues: Registry::new(),
            pipes: Registry::new(),
            mailboxes: Registry::new(),
            groups: Registry::new(),
            semaphores: Registry::new(),
            next_wait: 1,
        }
    }

    /// Identity for a new suspend record
    pub(crate) fn next_wait_id(&mut self) -> WaitId {
        let id = self.next_wait;
        self.next_wait = self.next_wait.wrapping_add(1);
        id
    }
}

/// The kernel lock, held
pub type KernelGuard<'a> = MutexGuard<'a, KernelState>;

struct KernelShared {
    state: Mutex<KernelState>,
    scheduler: Arc<dyn Scheduler>,
    config: KernelConfig,
}

/// Shared handle to the kernel objects
#[derive(Clone)]
pub struct Kernel {
    shared: Arc<KernelShared>,
}

impl Kernel {
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self::with_config(scheduler, KernelConfig::default())
    }

    pub fn with_config(scheduler: Arc<dyn Scheduler>, config: KernelConfig) -> Self {
        info!(
            "Kernel initialized (object names up to {} chars)",
            config.name_capacity
        );
        Self {
            shared: Arc::new(KernelShared {
                state: Mutex::new(KernelState::new()),
                scheduler,
                config,
            }),
        }
    }

    #[inline]
    pub fn scheduler(&self) -> &dyn Scheduler {
        self.shared.scheduler.as_ref()
    }

    #[inline]
    pub fn config(&self) -> &KernelConfig {
        &self.shared.config
    }

    #[inline]
    pub(crate) fn lock(&self) -> KernelGuard<'_> {
        self.shared.state.lock()
    }

    /// Clip a caller-supplied name to the configured capacity
    pub(crate) fn object_name(&self, name: &str) -> InlineString {
        InlineString::truncated(name, self.shared.config.name_capacity)
    }

    pub fn memory_pools(&self) -> MemoryPoolManager {
        MemoryPoolManager::new(self.clone())
    }

    pub fn partition_pools(&self) -> PartitionManager {
        PartitionManager::new(self.clone())
    }

    pub fn queues(&self) -> QueueManager {
        QueueManager::new(self.clone())
    }

    pub fn pipes(&self) -> PipeManager {
        PipeManager::new(self.clone())
    }

    pub fn mailboxes(&self) -> MailboxManager {
        MailboxManager::new(self.clone())
    }

    pub fn event_groups(&self) -> EventGroupManager {
        EventGroupManager::new(self.clone())
    }

    pub fn semaphores(&self) -> SemaphoreManager {
        SemaphoreManager::new(self.clone())
    }
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("Kernel")
            .field("pools", &state.pools.len())
            .field("partitions", &state.partitions.len())
            .field("queues", &state.queues.len())
            .field("pipes", &state.pipes.len())
            .field("mailboxes", &state.mailboxes.len())
            .field("groups", &state.groups.len())
            .field("semaphores", &state.semaphores.len())
            .finish()
    }
}
