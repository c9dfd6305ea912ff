//! Panel-backed control surface and board timebase

use defmt::*;
use embassy_time::Instant;

use crema_core::ingredients::{IngredientLevels, Shortfall};
use crema_core::time::ElapsedTime;
use crema_core::traits::{Clock, ControlSurface};
use crema_core::Phase;
use crema_protocol::PanelUpdate;

use crate::channels::PANEL_UPDATES;

/// Control surface that queues every write for the panel TX task
pub struct PanelSurface;

impl PanelSurface {
    fn send(&self, update: PanelUpdate) {
        // Never block the machine on a slow link
        if PANEL_UPDATES.try_send(update).is_err() {
            warn!("Panel update queue full, dropping {:?}", update);
        }
    }
}

impl ControlSurface for PanelSurface {
    fn set_indicator(&self, phase: Phase, active: bool) {
        self.send(PanelUpdate::Indicator { phase, active });
    }

    fn set_fill(&self, chamber: u16, dispenser: u16) {
        self.send(PanelUpdate::Fill { chamber, dispenser });
    }

    fn show_levels(&self, levels: IngredientLevels) {
        self.send(PanelUpdate::Levels {
            water: levels.water,
            beans: levels.beans,
            milk: levels.milk,
        });
    }

    fn show_elapsed(&self, elapsed: ElapsedTime) {
        self.send(PanelUpdate::Elapsed {
            seconds: elapsed.panel_seconds(),
        });
    }

    fn show_total_cups(&self, cups: u32) {
        self.send(PanelUpdate::TotalCups(cups));
    }

    fn show_power(&self, on: bool) {
        self.send(PanelUpdate::Power { on });
    }

    fn clear_selection(&self) {
        self.send(PanelUpdate::SelectionCleared);
    }

    fn report_shortfall(&self, shortfall: Shortfall) {
        self.send(PanelUpdate::Shortfall {
            ingredient: shortfall.ingredient,
            required: shortfall.required,
            available: shortfall.available,
        });
    }
}

/// Milliseconds since boot from the embassy time driver
pub struct UptimeClock;

impl Clock for UptimeClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}
