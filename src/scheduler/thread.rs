/*!
 * Thread Scheduler
 *
 * Host implementation of the scheduler collaborator: every task is an OS
 * thread, and suspension parks the thread on its own condvar paired with
 * the kernel lock. Preemption is advisory; a wake that favours the
 * resumed task only makes the waker yield its time slice.
 */

use super::traits::Scheduler;
use super::types::{TaskControl, TaskHandle, TaskInfo};
use crate::core::config::KernelConfig;
use crate::core::data_structures::InlineString;
use crate::core::limits::LOWEST_PRIORITY;
use crate::core::types::{Priority, SuspendReason, TaskId};
use crate::kernel::KernelGuard;
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Scheduler backed by OS threads
pub struct ThreadScheduler {
    tasks: DashMap<TaskId, Arc<TaskControl>, RandomState>,
    threads: DashMap<ThreadId, TaskId, RandomState>,
    next_id: AtomicU32,
    default_priority: Priority,
}

impl ThreadScheduler {
    pub fn new() -> Self {
        Self::with_config(&KernelConfig::default())
    }

    pub fn with_config(config: &KernelConfig) -> Self {
        Self {
            tasks: DashMap::with_hasher(RandomState::new()),
            threads: DashMap::with_hasher(RandomState::new()),
            next_id: AtomicU32::new(1),
            default_priority: config.default_priority,
        }
    }

    fn create_task(&self, name: &str, priority: Priority) -> Arc<TaskControl> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let control = Arc::new(TaskControl::new(id, InlineString::from(name), priority));
        self.tasks.insert(id, Arc::clone(&control));
        control
    }

    /// Turn the calling thread into a task
    ///
    /// A thread that is already a task keeps its identity.
    pub fn register_current(&self, name: &str, priority: Option<Priority>) -> TaskId {
        let thread = thread::current().id();
        if let Some(existing) = self.threads.get(&thread) {
            return *existing;
        }
        let control = self.create_task(name, priority.unwrap_or(self.default_priority));
        self.threads.insert(thread, control.id);
        debug!(task = control.id, name, priority = control.priority(), "task registered");
        control.id
    }

    /// Forget the calling thread's task, if it has one
    pub fn unregister_current(&self) {
        if let Some((_, task)) = self.threads.remove(&thread::current().id()) {
            self.tasks.remove(&task);
            debug!(task, "task unregistered");
        }
    }

    /// Run `f` as a new task on its own thread
    pub fn spawn_task<F, R>(
        self: &Arc<Self>,
        name: &str,
        priority: Priority,
        f: F,
    ) -> std::io::Result<TaskHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let control = self.create_task(name, priority);
        let id = control.id;
        let scheduler = Arc::clone(self);

        let spawned = thread::Builder::new().name(name.to_string()).spawn(move || {
            let _registration = Registration::new(scheduler, id);
            f()
        });

        match spawned {
            Ok(join) => {
                debug!(task = id, name, priority, "task spawned");
                Ok(TaskHandle { id, join })
            }
            Err(e) => {
                self.tasks.remove(&id);
                warn!(task = id, name, error = %e, "failed to spawn task thread");
                Err(e)
            }
        }
    }

    /// Change a task's priority; false if the task is unknown
    pub fn set_priority(&self, task: TaskId, priority: Priority) -> bool {
        match self.tasks.get(&task) {
            Some(control) => {
                control.priority.store(priority, Ordering::Release);
                true
            }
            None => false,
        }
    }

    pub fn task_info(&self, task: TaskId) -> Option<TaskInfo> {
        self.tasks.get(&task).map(|control| control.info())
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    fn control(&self, task: TaskId) -> Option<Arc<TaskControl>> {
        self.tasks.get(&task).map(|entry| Arc::clone(entry.value()))
    }
}

impl Default for ThreadScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ThreadScheduler {
    fn current_task(&self) -> Option<TaskId> {
        self.threads.get(&thread::current().id()).map(|task| *task)
    }

    fn task_priority(&self, task: TaskId) -> Priority {
        self.tasks
            .get(&task)
            .map(|control| control.priority())
            .unwrap_or(LOWEST_PRIORITY)
    }

    fn suspend_task(
        &self,
        guard: &mut KernelGuard<'_>,
        task: TaskId,
        reason: SuspendReason,
        timeout: Option<Duration>,
    ) {
        let Some(control) = self.control(task) else {
            warn!(task, reason = %reason, "suspend requested for unknown task");
            return;
        };

        control.resumed.store(false, Ordering::Release);
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        debug!(
            task,
            reason = %reason,
            timeout_ms = timeout.map(|t| t.as_millis() as u64),
            "task suspended"
        );

        while !control.resumed.load(Ordering::Acquire) {
            match deadline {
                Some(deadline) => {
                    if control.wakeup.wait_until(guard, deadline).timed_out() {
                        trace!(task, reason = %reason, "suspension timed out");
                        break;
                    }
                }
                None => control.wakeup.wait(guard),
            }
        }
    }

    fn resume_task(&self, task: TaskId, reason: SuspendReason) -> bool {
        let Some(control) = self.control(task) else {
            warn!(task, reason = %reason, "resume requested for unknown task");
            return false;
        };

        control.resumed.store(true, Ordering::Release);
        control.wakeup.notify_one();
        debug!(task, reason = %reason, "task resumed");

        match self.current_task() {
            Some(current) => control.priority() < self.task_priority(current),
            None => false,
        }
    }

    fn relinquish(&self) {
        thread::yield_now();
    }
}

/// Ties a spawned thread to its task for the thread's lifetime
struct Registration {
    scheduler: Arc<ThreadScheduler>,
    task: TaskId,
}

impl Registration {
    fn new(scheduler: Arc<ThreadScheduler>, task: TaskId) -> Self {
        scheduler.threads.insert(thread::current().id(), task);
        Self { scheduler, task }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.scheduler.threads.remove(&thread::current().id());
        self.scheduler.tasks.remove(&self.task);
    }
}
