/*!
 * Kernel Configuration
 *
 * Runtime knobs for logging and task defaults. Loaded from the
 * environment or a JSON document; everything else is fixed at compile
 * time in `core::limits`.
 */

use super::errors::KernelError;
use super::limits::{DEFAULT_TASK_PRIORITY, MAX_NAME};
use super::types::Priority;
use serde::{Deserialize, Serialize};

/// Kernel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// EnvFilter directive used when RUST_LOG is unset
    pub log_filter: String,
    /// Emit JSON trace records instead of the compact format
    pub trace_json: bool,
    /// Priority for tasks registered without one
    pub default_priority: Priority,
    /// Characters kept from an object name
    pub name_capacity: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            trace_json: false,
            default_priority: DEFAULT_TASK_PRIORITY,
            name_capacity: MAX_NAME - 1,
        }
    }
}

impl KernelConfig {
    /// Configuration for tests: quiet logs, default priorities
    pub fn quiet() -> Self {
        Self {
            log_filter: "warn".to_string(),
            ..Self::default()
        }
    }

    /// Read overrides from the environment
    ///
    /// - KERNEL_LOG: filter directive (default: info)
    /// - KERNEL_TRACE_JSON: "1" or "true" for JSON output
    /// - KERNEL_DEFAULT_PRIORITY: 0-255
    pub fn from_env() -> Result<Self, KernelError> {
        let mut config = Self::default();

        if let Ok(filter) = std::env::var("KERNEL_LOG") {
            config.log_filter = filter;
        }

        if let Ok(json) = std::env::var("KERNEL_TRACE_JSON") {
            config.trace_json = json == "1" || json.eq_ignore_ascii_case("true");
        }

        if let Ok(priority) = std::env::var("KERNEL_DEFAULT_PRIORITY") {
            config.default_priority = priority.trim().parse().map_err(|_| {
                KernelError::Configuration(
                    format!("KERNEL_DEFAULT_PRIORITY must be 0-255, got '{}'", priority).into(),
                )
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, KernelError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| KernelError::Configuration(e.to_string().into()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), KernelError> {
        if self.name_capacity == 0 {
            return Err(KernelError::Configuration(
                "name_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
