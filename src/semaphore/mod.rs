/*!
 * Counting Semaphores
 */

mod manager;
mod types;

pub use manager::{Semaphore, SemaphoreManager};
pub use types::{SemaphoreError, SemaphoreHandle, SemaphoreInfo, SemaphoreResult};
