/*!
 * Pipe Lifecycle Operations
 */

use super::manager::PipeManager;
use super::types::{Pipe, PipeError, PipeHandle, PipeInfo, PipeResult};
use crate::core::types::{SuspendPolicy, SuspendReason};
use crate::ipc::channel::MessageType;
use crate::suspend::{self, WaitStatus};
use log::{info, warn};

impl PipeManager {
    /// Create a pipe over a caller-supplied byte buffer
    ///
    /// A fixed pipe only uses whole message slots of the buffer; a
    /// variable pipe only whole words.
    pub fn create(
        &self,
        name: &str,
        buffer: Box<[u8]>,
        message_type: MessageType,
        message_size: usize,
        policy: SuspendPolicy,
    ) -> PipeResult<PipeHandle> {
        let pipe_size = buffer.len();
        let fits = Pipe::footprint(message_type, message_size)
            .is_some_and(|footprint| footprint <= pipe_size);
        if pipe_size == 0 || message_size == 0 || !fits {
            warn!(
                "Rejected pipe '{}': {} bytes for {} messages of {} bytes",
                name, pipe_size, message_type, message_size
            );
            return Err(PipeError::InvalidSize);
        }

        let name = self.kernel.object_name(name);
        let pipe = Pipe::new(
            name.clone(),
            buffer,
            message_type,
            message_size,
            policy,
            SuspendReason::Pipe,
        );
        let usable = pipe.capacity();
        let handle = self.kernel.lock().pipes.insert(pipe);

        info!(
            "Pipe '{}' created: {} bytes, {} messages up to {} bytes, {} suspension",
            name, usable, message_type, message_size, policy
        );
        Ok(handle)
    }

    /// Discard every message and release all suspended callers with
    /// `PipeReset`
    pub fn reset(&self, handle: PipeHandle) -> PipeResult<()> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let pipe = state.pipes.get_mut(handle).ok_or(PipeError::InvalidPipe)?;

        let waiting = pipe.tasks_waiting();
        let mut preempt = pipe.waiters.force_wake_all(scheduler, || WaitStatus::Reset);
        preempt |= pipe.urgent.force_wake_all(scheduler, || WaitStatus::Reset);
        pipe.clear();
        info!("Pipe '{}' reset ({} waiters released)", pipe.name, waiting);
        drop(state);

        suspend::yield_if_preempted(scheduler, preempt);
        Ok(())
    }

    /// Delete a pipe, releasing all suspended callers with `PipeDeleted`
    ///
    /// The buffer goes back to the caller.
    pub fn delete(&self, handle: PipeHandle) -> PipeResult<Box<[u8]>> {
        let scheduler = self.kernel.scheduler();
        let mut state = self.kernel.lock();
        let mut pipe = state.pipes.remove(handle).ok_or(PipeError::InvalidPipe)?;

        let waiting = pipe.tasks_waiting();
        let mut preempt = pipe.waiters.force_wake_all(scheduler, || WaitStatus::Deleted);
        preempt |= pipe.urgent.force_wake_all(scheduler, || WaitStatus::Deleted);
        drop(state);

        info!("Pipe '{}' deleted ({} waiters released)", pipe.name, waiting);
        suspend::yield_if_preempted(scheduler, preempt);
        Ok(pipe.into_buffer())
    }

    pub fn information(&self, handle: PipeHandle) -> PipeResult<PipeInfo> {
        let state = self.kernel.lock();
        state
            .pipes
            .get(handle)
            .map(PipeInfo::of)
            .ok_or(PipeError::InvalidPipe)
    }

    /// Up to `max` live pipes, oldest first
    pub fn pipe_handles(&self, max: usize) -> Vec<PipeHandle> {
        self.kernel.lock().pipes.handles(max)
    }

    /// Number of live pipes
    pub fn established(&self) -> usize {
        self.kernel.lock().pipes.len()
    }
}
