//! # Proximity Sensor Boundary

//! The collider/trigger-volume code that detects entities near a door lives in the host. This
//! module fixes the calls that code makes into a door (`SensorListener`), the re-query the door
//! may make back into it (`OccupancyProbe`), and a reference adapter (`RegionSensor`) that pairs
//! enters with exits by entity id.

pub mod region_sensor;

pub use region_sensor::{RegionSensor, SharedOccupancyProbe};

use crate::models::EntityId;

/// Calls a proximity sensor adapter makes into a door.
pub trait SensorListener {
    /// A distinct occupant arrived inside the sensed region.
    fn on_entity_entered(&mut self, entity: EntityId);

    /// An occupant left the sensed region.
    fn on_entity_exited(&mut self, entity: EntityId);

    /// The sensor became active; `already_inside` occupants were inside its region at that moment.
    fn on_sensor_activated(&mut self, already_inside: u32);

    /// The sensor stopped reporting.
    fn on_sensor_deactivated(&mut self);
}

/// Fresh occupancy count straight from the adapter, used to correct a drifting counter.
pub trait OccupancyProbe {
    fn occupants(&self) -> u32;
}
