//! Control surface trait

use crema_protocol::Phase;

use crate::ingredients::{IngredientLevels, Shortfall};
use crate::time::ElapsedTime;

/// Outputs of the front panel
///
/// All methods take `&self`: the machine holds a shared reference while a
/// sequence is suspended, and power-off writes to the same surface.
/// Implementations use interior mutability or forward to a queue.
pub trait ControlSurface {
    /// Light or clear one phase indicator
    fn set_indicator(&self, phase: Phase, active: bool);

    /// Brew chamber and dispenser gauges, in ingredient units
    fn set_fill(&self, chamber: u16, dispenser: u16);

    fn show_levels(&self, levels: IngredientLevels);

    /// Duration of the last completed sequence
    fn show_elapsed(&self, elapsed: ElapsedTime);

    fn show_total_cups(&self, cups: u32);

    /// Power button state
    fn show_power(&self, on: bool);

    /// Reset the beverage selector
    fn clear_selection(&self);

    /// A brew was refused for lack of an ingredient
    fn report_shortfall(&self, shortfall: Shortfall);

    /// Clear every phase indicator
    fn clear_indicators(&self) {
        for phase in Phase::ALL {
            self.set_indicator(phase, false);
        }
    }
}
