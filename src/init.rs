use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::info;
use crate::config::Settings;
use crate::controllers::SlidingDoorController;
use crate::event_handling::{EventDispatcher, EventHandler};
use crate::models::DoorEvent;
use crate::rig::TracingRig;
use crate::simulation::{walkthrough, ScenarioLoader, ScenarioRunner};

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Everything the demo binary needs to drive one door
pub struct AppContext {
    pub settings: Settings,
    pub door: SlidingDoorController<TracingRig>,
    pub scenario: ScenarioRunner,
    pub dispatcher: EventDispatcher,
    pub event_handler: EventHandler,
}

/// Builds the door, its scenario and the event pipeline from loaded settings
///
/// The scenario comes from `simulation.scenario_path` when set and from the built-in
/// walk-through otherwise. A positive `door.reconcile_interval` wires the scenario's region
/// sensor in as the door's occupancy probe.
pub fn initialize(settings: Settings) -> Result<AppContext> {
    let rig = TracingRig::new(settings.simulation.closed_pose());
    let mut door = SlidingDoorController::new(settings.door.clone(), rig)
        .context("Failed to create sliding door controller")?;

    let inputs = match &settings.simulation.scenario_path {
        Some(path) => ScenarioLoader::new(path.clone()).load()?,
        None => {
            info!("No scenario configured, using the built-in walk-through");
            walkthrough()
        }
    };
    let scenario = ScenarioRunner::new(inputs);

    if settings.door.reconcile_interval > 0.0 {
        door.attach_occupancy_probe(Box::new(scenario.sensor().probe()));
    }

    let (dispatcher, receiver): (EventDispatcher, mpsc::Receiver<DoorEvent>) =
        EventDispatcher::channel(EVENT_CHANNEL_CAPACITY);
    let event_handler = EventHandler::new(receiver);

    info!(
        "Door '{}' ready: {} scripted inputs, tick every {}ms",
        door.name(),
        scenario.remaining(),
        settings.simulation.tick_interval_ms
    );

    Ok(AppContext { settings, door, scenario, dispatcher, event_handler })
}
