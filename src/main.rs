/*!
 * Rendezvous - Main Entry Point
 *
 * Runs the broadcast demo, then one harness run configured from the
 * environment, and prints the run report as JSON.
 */

use std::error::Error;
use tracing::info;

use rendezvous::core::limits::DEMO_WAITERS;
use rendezvous::{init_tracing, run_broadcast_demo, Harness, HarnessConfig};

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    info!("Running broadcast demo...");
    let order = run_broadcast_demo(DEMO_WAITERS)?;
    info!(?order, "Demo complete");

    let config = HarnessConfig::from_env()?;
    info!(
        mode = %config.mode,
        waiters = config.waiters,
        channel_broadcast = %config.channel_broadcast,
        "Starting harness run"
    );

    let report = Harness::new(config)?.run()?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
