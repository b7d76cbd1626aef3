pub mod scenario;

pub use scenario::{parse_scenario, walkthrough, ScenarioAction, ScenarioLoader, ScenarioRunner, ScriptedInput};
