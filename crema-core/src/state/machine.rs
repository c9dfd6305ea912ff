//! State machine definition
//!
//! Indicator, consumption and gating behavior is a function of the current
//! state and an event.

use crema_protocol::{Beverage, Phase};

use super::events::Event;

/// Machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Powered down
    #[default]
    Off,
    /// Flushing after an unclean shutdown
    Purging,
    /// Boiler warming up
    Heating,
    /// On and idle, brews accepted
    Ready,
    /// Beans going through the grinder
    Grinding,
    /// Water (and milk) through the chamber
    Brewing,
    /// Beverage flowing to the cup
    Dispensing,
}

impl State {
    /// Check if a timed phase is running
    pub fn is_busy(&self) -> bool {
        self.active_phase().is_some()
    }

    /// Check if the machine is switched on
    pub fn is_powered(&self) -> bool {
        !matches!(self, State::Off)
    }

    /// Check if a brew may start
    pub fn accepts_brew(&self) -> bool {
        matches!(self, State::Ready)
    }

    /// Phase whose indicator this state lights
    pub fn active_phase(&self) -> Option<Phase> {
        match self {
            State::Purging => Some(Phase::Purging),
            State::Heating => Some(Phase::Heating),
            State::Grinding => Some(Phase::Grinding),
            State::Brewing => Some(Phase::Brewing),
            State::Dispensing => Some(Phase::Dispensing),
            State::Off | State::Ready => None,
        }
    }

    /// Process an event and return the next state
    ///
    /// Pairs not listed leave the state unchanged, so late events from a
    /// cancelled sequence have no effect.
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            // Power-on
            (Off, PowerOn { clean_shutdown: false }) => Purging,
            (Off, PowerOn { clean_shutdown: true }) => Heating,
            (Purging, PhaseComplete) => Heating,
            (Heating, PhaseComplete) => Ready,

            // Brewing
            (Ready, Brew(Beverage::HotWater)) => Dispensing,
            (Ready, Brew(Beverage::Coffee | Beverage::Latte)) => Grinding,
            (Grinding, PhaseComplete) => Brewing,
            (Brewing, PhaseComplete) => Dispensing,
            (Dispensing, PhaseComplete) => Ready,

            // Power-off from anywhere
            (_, PowerOff) => Off,

            // Default: stay in current state
            _ => self,
        }
    }
}
