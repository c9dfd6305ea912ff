//! Machine task
//!
//! Owns the coffee machine and serves panel events for the life of the
//! firmware.

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Delay;

use crema_core::config::MachineConfig;
use crema_core::machine::CoffeeMachine;

use crate::channels::PANEL_EVENTS;
use crate::panel::{PanelSurface, UptimeClock};

type Machine = CoffeeMachine<CriticalSectionRawMutex, PanelSurface, Delay, UptimeClock>;

#[embassy_executor::task]
pub async fn machine_task(config: MachineConfig) {
    info!("Machine task started");

    let machine: Machine = CoffeeMachine::new(config, PanelSurface, Delay, UptimeClock);

    // Bring the panel in line with a machine that is off and full
    machine.refresh_panel();

    machine.serve(&PANEL_EVENTS).await;
}
