use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use tracing::debug;
use crate::models::EntityId;
use crate::sensors::{OccupancyProbe, SensorListener};

/// Reference adapter that tracks which entities are inside its region.
///
/// Duplicate enters and unmatched exits are dropped here, so the door's counter only ever sees
/// paired events. The occupant set is shared with any probe handed out by [`RegionSensor::probe`].
#[derive(Debug, Clone, Default)]
pub struct RegionSensor {
    inside: Rc<RefCell<BTreeSet<EntityId>>>,
    active: bool,
}

/// Read-only view of a `RegionSensor`'s occupants.
#[derive(Debug, Clone)]
pub struct SharedOccupancyProbe {
    inside: Rc<RefCell<BTreeSet<EntityId>>>,
}

impl OccupancyProbe for SharedOccupancyProbe {
    fn occupants(&self) -> u32 {
        count(&self.inside)
    }
}

impl RegionSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn occupants(&self) -> u32 {
        count(&self.inside)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.inside.borrow().contains(&entity)
    }

    pub fn probe(&self) -> SharedOccupancyProbe {
        SharedOccupancyProbe { inside: Rc::clone(&self.inside) }
    }

    /// Activates the sensor with `already_inside` entities in the region and tells the door.
    pub fn activate<L: SensorListener>(&mut self, already_inside: &[EntityId], listener: &mut L) {
        {
            let mut inside = self.inside.borrow_mut();
            inside.clear();
            inside.extend(already_inside.iter().copied());
        }
        self.active = true;
        listener.on_sensor_activated(self.occupants());
    }

    pub fn deactivate<L: SensorListener>(&mut self, listener: &mut L) {
        self.inside.borrow_mut().clear();
        self.active = false;
        listener.on_sensor_deactivated();
    }

    pub fn entity_entered<L: SensorListener>(&mut self, entity: EntityId, listener: &mut L) {
        if !self.inside.borrow_mut().insert(entity) {
            debug!("Ignoring duplicate enter for {}", entity);
            return;
        }
        listener.on_entity_entered(entity);
    }

    pub fn entity_exited<L: SensorListener>(&mut self, entity: EntityId, listener: &mut L) {
        if !self.inside.borrow_mut().remove(&entity) {
            debug!("Ignoring exit for {} which was not inside", entity);
            return;
        }
        listener.on_entity_exited(entity);
    }

    /// Changes the occupant set without notifying the door, as happens when trigger callbacks are lost.
    pub fn silently_remove(&mut self, entity: EntityId) -> bool {
        self.inside.borrow_mut().remove(&entity)
    }
}

fn count(inside: &RefCell<BTreeSet<EntityId>>) -> u32 {
    u32::try_from(inside.borrow().len()).unwrap_or(u32::MAX)
}
