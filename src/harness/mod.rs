/*!
 * Benchmark Harness
 *
 * Spins up waiter threads, blocks them on a chosen primitive, releases them
 * with a chosen pattern and reports how long the release took.
 */

mod config;
mod gate;
mod mode;
mod runner;

pub use config::HarnessConfig;
pub use gate::{ArrivalGate, ArrivalToken};
pub use mode::Mode;
pub(crate) use runner::join_all;
pub use runner::{Harness, RunReport};
