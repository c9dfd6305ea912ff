//! Session record and observable machine state

use crema_protocol::Beverage;

use crate::ingredients::IngredientLevels;
use crate::state::State;
use crate::time::ElapsedTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What the machine remembers between power cycles (in memory only)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MachineRecord {
    /// Last power-off happened while nothing was running
    pub properly_shutdown: bool,
    pub total_cups: u32,
}

impl MachineRecord {
    pub const fn new() -> Self {
        Self {
            properly_shutdown: true,
            total_cups: 0,
        }
    }
}

impl Default for MachineRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Power and activity flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OperationFlags {
    pub machine_on: bool,
    /// A power-on or brew sequence holds the runner
    pub operating: bool,
}

/// Copy of everything observable about the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MachineSnapshot {
    pub state: State,
    pub record: MachineRecord,
    pub flags: OperationFlags,
    pub levels: IngredientLevels,
    pub selection: Option<Beverage>,
    pub chamber: u16,
    pub dispenser: u16,
    pub last_elapsed: ElapsedTime,
}
