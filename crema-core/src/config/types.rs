//! Configuration type definitions

use crema_protocol::{Phase, ServingSize};

use crate::ingredients::MAX_LEVEL;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Units of each ingredient in a single cup
pub const DEFAULT_DOSE_UNITS: u8 = 5;

/// A carafe is this many cups
pub const DEFAULT_CARAFE_MULTIPLIER: u8 = 4;

/// How long each phase runs, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseTimings {
    pub purging_ms: u32,
    pub heating_ms: u32,
    pub grinding_ms: u32,
    pub brewing_ms: u32,
    pub dispensing_ms: u32,
}

impl PhaseTimings {
    pub const fn new() -> Self {
        Self {
            purging_ms: 2000,
            heating_ms: 3000,
            grinding_ms: 2000,
            brewing_ms: 3000,
            dispensing_ms: 3000,
        }
    }

    pub fn duration_ms(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Purging => self.purging_ms,
            Phase::Heating => self.heating_ms,
            Phase::Grinding => self.grinding_ms,
            Phase::Brewing => self.brewing_ms,
            Phase::Dispensing => self.dispensing_ms,
        }
    }

    pub fn set_duration_ms(&mut self, phase: Phase, ms: u32) {
        let slot = match phase {
            Phase::Purging => &mut self.purging_ms,
            Phase::Heating => &mut self.heating_ms,
            Phase::Grinding => &mut self.grinding_ms,
            Phase::Brewing => &mut self.brewing_ms,
            Phase::Dispensing => &mut self.dispensing_ms,
        };
        *slot = ms;
    }
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self::new()
    }
}

/// What a brew does when an ingredient runs short
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConsumptionPolicy {
    /// Check the whole recipe up front and refuse the brew on any shortfall
    #[default]
    Gated,
    /// Consume phase by phase and carry on with whatever was available
    Lenient,
}

/// Machine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MachineConfig {
    pub phases: PhaseTimings,
    /// Units of each ingredient per cup
    pub dose_units: u8,
    /// Cups per carafe
    pub carafe_multiplier: u8,
    pub consumption: ConsumptionPolicy,
    /// Abandon the running sequence when the machine is switched off
    pub cancel_on_power_off: bool,
}

impl MachineConfig {
    pub const fn new() -> Self {
        Self {
            phases: PhaseTimings::new(),
            dose_units: DEFAULT_DOSE_UNITS,
            carafe_multiplier: DEFAULT_CARAFE_MULTIPLIER,
            consumption: ConsumptionPolicy::Gated,
            cancel_on_power_off: true,
        }
    }

    /// Legacy panel settings: speculative consumption and no cancellation on
    /// power-off.
    ///
    /// One difference remains. The legacy panel let a power-on start while a
    /// stale sequence was still running; here the stale sequence keeps the
    /// runner, so power-on is ignored as `Busy` until it finishes.
    pub const fn legacy() -> Self {
        Self {
            consumption: ConsumptionPolicy::Lenient,
            cancel_on_power_off: false,
            ..Self::new()
        }
    }

    /// Cups made by one press of the given button
    pub fn multiplier(&self, serving: ServingSize) -> u8 {
        match serving {
            ServingSize::Cup => 1,
            ServingSize::Carafe => self.carafe_multiplier,
        }
    }

    /// Units of each ingredient one serving needs
    pub fn dose(&self, serving: ServingSize) -> u8 {
        self.dose_units.saturating_mul(self.multiplier(serving))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(phase) = Phase::ALL
            .into_iter()
            .find(|p| self.phases.duration_ms(*p) == 0)
        {
            return Err(ConfigError::ZeroDuration(phase));
        }
        if self.dose_units == 0 {
            return Err(ConfigError::ZeroDose);
        }
        if self.carafe_multiplier == 0 {
            return Err(ConfigError::ZeroMultiplier);
        }

        let carafe_dose = self.dose_units as u16 * self.carafe_multiplier as u16;
        if carafe_dose > MAX_LEVEL as u16 {
            return Err(ConfigError::DoseExceedsCapacity { dose: carafe_dose });
        }
        Ok(())
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Rejected configuration values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A phase would finish instantly
    ZeroDuration(Phase),
    ZeroDose,
    ZeroMultiplier,
    /// A carafe needs more than a full reservoir
    DoseExceedsCapacity { dose: u16 },
}
