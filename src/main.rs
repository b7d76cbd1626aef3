use std::time::Duration;
use anyhow::Result;
use tracing::{error, info};
use tokio::signal::ctrl_c;
use tokio::time::interval;
use sliding_door::config::Settings;
use sliding_door::init::{initialize, AppContext};
use sliding_door::utils::logging;

/// The main entry point of the sliding door demo
///
/// Replays a scenario against a single door on a fixed tick and logs what the door does.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Application error: {:#}", e);
        std::process::exit(1);
    }
}

/// The core logic of the demo
///
/// 1. Loads application settings from configuration files
/// 2. Initializes the logging system
/// 3. Builds the door, scenario and event pipeline
/// 4. Spawns a task to run the `EventHandler`
/// 5. Ticks the door until the scenario is done and the door is idle, or a shutdown signal arrives
async fn run() -> Result<()> {
    let settings = Settings::new()?;
    let _guard = logging::init_logger(&settings.logging.level, settings.logging.path.clone())?;

    let AppContext { settings, mut door, mut scenario, dispatcher, event_handler } = initialize(settings)?;

    let handler_task = tokio::spawn(event_handler.run());

    let tick_ms = settings.simulation.tick_interval_ms.max(1);
    let dt = tick_ms as f32 / 1000.0;
    let mut tick_interval = interval(Duration::from_millis(tick_ms));

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                scenario.deliver_due(door.clock(), &mut door);
                door.tick(dt);
                if let Err(e) = dispatcher.dispatch_events(door.drain_events()) {
                    error!("Error forwarding door events: {}", e);
                }
                if scenario.is_finished() && door.is_idle() {
                    info!("Scenario complete at t={:.2}s", door.clock());
                    break;
                }
            }
            _ = ctrl_c() => {
                info!("Received shutdown signal. Shutting down gracefully...");
                break;
            }
        }
    }

    drop(dispatcher);
    let summary = handler_task.await?;
    info!(
        "Door '{}' finished {:?}: {} events, {} state changes, {} reversals, {} rejections, {} pending replays, {} reconciliations, {} underflows",
        door.name(),
        door.state(),
        summary.events,
        summary.state_changes,
        summary.reversals,
        summary.rejections,
        summary.pending_drained,
        summary.reconciliations,
        summary.underflows
    );
    Ok(())
}
