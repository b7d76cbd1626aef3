use serde::{Deserialize, Serialize};

/// Lock flag plus the switch that enables the locking feature.
///
/// With locking disabled the gate is always permissive, whatever the raw flag says.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockGate {
    locked: bool,
    enabled: bool,
}

impl LockGate {
    pub fn new(enabled: bool, locked: bool) -> Self {
        Self { locked, enabled }
    }

    /// Sets the raw flag. Returns `true` if it changed.
    pub fn lock(&mut self) -> bool {
        !std::mem::replace(&mut self.locked, true)
    }

    /// Clears the raw flag. Returns `true` if it changed.
    pub fn unlock(&mut self) -> bool {
        std::mem::replace(&mut self.locked, false)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_effectively_locked(&self) -> bool {
        self.enabled && self.locked
    }
}
