use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use anyhow::{Context, Result};
use log::info;
use crate::controllers::SlidingDoorController;
use crate::errors::{DoorError, DoorResult};
use crate::models::{EntityId, OperationMode};
use crate::rig::DoorRig;
use crate::sensors::RegionSensor;

/// Something that happens to the door at a scripted time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioAction {
    Enter { entity: u64 },
    Exit { entity: u64 },
    Open,
    Close {
        #[serde(default)]
        force: bool,
    },
    Toggle,
    ForceClear,
    ForceTrigger { open: bool },
    Lock,
    Unlock,
    KeypadGranted,
    KeypadClosed,
    SetMode { mode: OperationMode },
    SensorActivated {
        #[serde(default)]
        already_inside: Vec<u64>,
    },
    SensorDeactivated,
}

/// A scenario entry: an action and the clock time it is delivered at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedInput {
    /// Seconds of door clock time
    pub at_secs: f64,
    #[serde(flatten)]
    pub action: ScenarioAction,
}

impl ScriptedInput {
    pub fn new(at_secs: f64, action: ScenarioAction) -> Self {
        Self { at_secs, action }
    }
}

/// Loads scripted inputs from a JSON file
pub struct ScenarioLoader {
    /// The path to the JSON file containing the scenario
    path: PathBuf,
}

impl ScenarioLoader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Reads and validates the scenario file
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ScriptedInput>)`: The inputs in file order
    /// * `Err(anyhow::Error)`: If the file cannot be opened or parsed, or an entry has an invalid time
    pub fn load(&self) -> Result<Vec<ScriptedInput>> {
        info!("Loading scenario from {:?}", self.path);
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open scenario file: {:?}", self.path))?;
        let inputs: Vec<ScriptedInput> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| "Failed to parse scenario")?;
        validate(&inputs)?;
        info!("Loaded {} scripted inputs", inputs.len());
        Ok(inputs)
    }
}

/// Parses and validates a scenario held in memory.
pub fn parse_scenario(json: &str) -> DoorResult<Vec<ScriptedInput>> {
    let inputs: Vec<ScriptedInput> = serde_json::from_str(json)?;
    validate(&inputs)?;
    Ok(inputs)
}

fn validate(inputs: &[ScriptedInput]) -> DoorResult<()> {
    match inputs.iter().position(|input| !input.at_secs.is_finite() || input.at_secs < 0.0) {
        Some(index) => Err(DoorError::ScenarioError(format!(
            "entry {} has invalid time {}",
            index, inputs[index].at_secs
        ))),
        None => Ok(()),
    }
}

/// A short walk-through used when no scenario file is configured: two people pass through a
/// sensor-driven door, one turns back mid-close, then the door is locked and cleared.
pub fn walkthrough() -> Vec<ScriptedInput> {
    use ScenarioAction::*;
    vec![
        ScriptedInput::new(0.0, SensorActivated { already_inside: Vec::new() }),
        ScriptedInput::new(0.2, Enter { entity: 1 }),
        ScriptedInput::new(0.6, Enter { entity: 2 }),
        ScriptedInput::new(1.8, Exit { entity: 1 }),
        ScriptedInput::new(2.4, Exit { entity: 2 }),
        ScriptedInput::new(3.2, Enter { entity: 2 }),
        ScriptedInput::new(4.5, Exit { entity: 2 }),
        ScriptedInput::new(6.5, KeypadClosed),
        ScriptedInput::new(6.8, Enter { entity: 3 }),
        ScriptedInput::new(7.2, Exit { entity: 3 }),
        ScriptedInput::new(7.5, KeypadGranted),
        ScriptedInput::new(7.6, Enter { entity: 3 }),
        ScriptedInput::new(8.2, ForceClear),
    ]
}

/// Delivers scripted inputs to a door as its clock passes their times
pub struct ScenarioRunner {
    inputs: Vec<ScriptedInput>,
    cursor: usize,
    sensor: RegionSensor,
}

impl ScenarioRunner {
    pub fn new(mut inputs: Vec<ScriptedInput>) -> Self {
        inputs.sort_by(|a, b| a.at_secs.total_cmp(&b.at_secs));
        Self { inputs, cursor: 0, sensor: RegionSensor::new() }
    }

    pub fn sensor(&self) -> &RegionSensor {
        &self.sensor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.inputs.len()
    }

    pub fn remaining(&self) -> usize {
        self.inputs.len() - self.cursor
    }

    /// Applies every input due at or before `now`; returns how many were applied.
    pub fn deliver_due<R: DoorRig>(&mut self, now: f64, door: &mut SlidingDoorController<R>) -> usize {
        let mut delivered = 0;
        while let Some(input) = self.inputs.get(self.cursor) {
            if input.at_secs > now {
                break;
            }
            let action = input.action.clone();
            self.cursor += 1;
            info!("t={:.2}s scenario: {:?}", now, action);
            self.apply(action, door);
            delivered += 1;
        }
        delivered
    }

    fn apply<R: DoorRig>(&mut self, action: ScenarioAction, door: &mut SlidingDoorController<R>) {
        match action {
            ScenarioAction::Enter { entity } => self.sensor.entity_entered(EntityId(entity), door),
            ScenarioAction::Exit { entity } => self.sensor.entity_exited(EntityId(entity), door),
            ScenarioAction::Open => door.request_open(false),
            ScenarioAction::Close { force } => door.request_close(force),
            ScenarioAction::Toggle => door.toggle(),
            ScenarioAction::ForceClear => door.force_clear(),
            ScenarioAction::ForceTrigger { open } => door.force_trigger(open),
            ScenarioAction::Lock => door.lock(),
            ScenarioAction::Unlock => door.unlock(),
            ScenarioAction::KeypadGranted => door.keypad_granted(),
            ScenarioAction::KeypadClosed => door.keypad_closed(),
            ScenarioAction::SetMode { mode } => door.set_operation_mode(mode),
            ScenarioAction::SensorActivated { already_inside } => {
                let ids: Vec<EntityId> = already_inside.into_iter().map(EntityId).collect();
                self.sensor.activate(&ids, door);
            }
            ScenarioAction::SensorDeactivated => self.sensor.deactivate(door),
        }
    }
}
