/*!
 * Monitoring
 * Tracing subscriber setup and suspension spans
 */

mod tracer;

pub use tracer::{init_tracing, WaitSpan};
