//! Events that trigger state transitions

use crema_protocol::Beverage;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Power events
    /// Power button pressed while off
    PowerOn {
        /// Whether the previous session shut down while idle
        clean_shutdown: bool,
    },
    /// Power button pressed while on
    PowerOff,

    // Sequencer events
    /// The running phase finished its duration
    PhaseComplete,
    /// Brew requested for the selected beverage
    Brew(Beverage),
}
