/*!
 * Monitoring
 * Logging setup
 */

mod tracer;

pub use tracer::{init_test_tracing, init_tracing};
