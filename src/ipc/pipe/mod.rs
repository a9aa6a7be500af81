/*!
 * Pipes
 * Circular byte buffers with fixed or variable messages, urgent sends
 * and broadcast
 */

mod lifecycle;
mod manager;
mod operations;
mod types;

pub use manager::PipeManager;
pub use types::{Pipe, PipeError, PipeHandle, PipeInfo, PipeResult};
