/*!
 * Scheduler
 *
 * The scheduler is an external collaborator: the kernel objects only call
 * the `Scheduler` trait. `ThreadScheduler` is the host implementation,
 * running each task on its own OS thread.
 */

mod thread;
mod traits;
mod types;

pub use thread::ThreadScheduler;
pub use traits::Scheduler;
pub use types::{TaskControl, TaskHandle, TaskInfo};
