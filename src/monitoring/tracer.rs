/*!
 * Tracing
 * Subscriber setup and spans around task suspensions
 */

use crate::core::config::KernelConfig;
use crate::core::types::{SuspendReason, TaskId};
use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
    EnvFilter,
};

/// Suspensions longer than this are reported at warn level
const SLOW_WAIT: Duration = Duration::from_millis(500);

/// Install the global subscriber
///
/// `RUST_LOG` wins over the configured filter. Fails if a subscriber is
/// already installed.
pub fn init_tracing(config: &KernelConfig) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.trace_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()?;
        info!("Structured tracing initialized with JSON output");
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_names(true)
                    .compact(),
            )
            .try_init()?;
        info!("Structured tracing initialized");
    }
    Ok(())
}

/// Span covering one task suspension, from block to resumption
pub struct WaitSpan {
    span: tracing::Span,
    start: Instant,
    task: TaskId,
    reason: SuspendReason,
}

impl WaitSpan {
    pub fn new(task: TaskId, reason: SuspendReason, timeout: Option<Duration>) -> Self {
        let timeout_ms = timeout.map(|t| t.as_millis() as u64);
        let span = span!(
            Level::DEBUG,
            "suspend",
            task = task,
            reason = %reason,
            timeout_ms = ?timeout_ms,
            waited_us = tracing::field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
            task,
            reason,
        }
    }

    /// Record how the suspension ended
    pub fn record_outcome(&self, outcome: &str) {
        let _entered = self.span.enter();
        debug!(task = self.task, reason = %self.reason, outcome, "task resumed");
    }
}

impl Drop for WaitSpan {
    fn drop(&mut self) {
        let waited = self.start.elapsed();
        self.span.record("waited_us", waited.as_micros() as u64);
        if waited > SLOW_WAIT {
            let _entered = self.span.enter();
            warn!(
                task = self.task,
                reason = %self.reason,
                waited_ms = waited.as_millis() as u64,
                "long suspension"
            );
        }
    }
}
