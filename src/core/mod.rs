/*!
 * Core Module
 * Fundamental kernel types, limits, configuration and error handling
 */

pub mod config;
pub mod data_structures;
pub mod errors;
pub mod id;
pub mod limits;
pub mod types;

// Re-export for convenience
pub use config::KernelConfig;
pub use data_structures::InlineString;
pub use errors::*;
pub use id::Handle;
pub use types::*;
