//! Panel command dispatch
//!
//! Maps panel events onto machine operations. Instant commands run inline;
//! power-on and brewing are returned as an `Operation` for the caller to
//! drive.

use core::pin::pin;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embedded_hal_async::delay::DelayNs;

use crema_protocol::{Beverage, PanelEvent, ServingSize};

use crate::traits::{Clock, ControlSurface};

use super::{BrewOutcome, CoffeeMachine, PowerOutcome};
#[cfg(feature = "defmt")]
use super::Rejection;

/// A long-running command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation {
    PowerOn,
    Brew(Beverage, ServingSize),
}

/// Result of a long-running command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    Power(PowerOutcome),
    Brew(BrewOutcome),
}

impl<M, S, D, C> CoffeeMachine<M, S, D, C>
where
    M: RawMutex,
    S: ControlSurface,
    D: DelayNs,
    C: Clock,
{
    /// Apply an instant command, or return the long operation it asks for
    pub fn dispatch(&self, event: PanelEvent) -> Option<Operation> {
        #[cfg(feature = "defmt")]
        defmt::debug!("panel event: {}", event);

        match event {
            PanelEvent::PowerToggle => {
                if self.is_on() {
                    self.power_off();
                    None
                } else {
                    Some(Operation::PowerOn)
                }
            }
            PanelEvent::Brew(serving) => match self.selection() {
                Some(beverage) => Some(Operation::Brew(beverage, serving)),
                None => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("brew ignored: {}", Rejection::NoSelection);
                    None
                }
            },
            PanelEvent::RefillAll => {
                self.refill();
                None
            }
            PanelEvent::SelectBeverage(beverage) => {
                self.select_beverage(beverage);
                None
            }
            PanelEvent::SetLevel { ingredient, level } => {
                let _ = self.adjust_level(ingredient, level);
                None
            }
        }
    }

    pub async fn execute(&self, operation: Operation) -> Outcome {
        match operation {
            Operation::PowerOn => Outcome::Power(self.power_on().await),
            Operation::Brew(beverage, serving) => {
                Outcome::Brew(self.prepare_beverage(beverage, serving).await)
            }
        }
    }

    /// Handle one panel event to completion
    pub async fn handle(&self, event: PanelEvent) -> Option<Outcome> {
        match self.dispatch(event) {
            Some(operation) => Some(self.execute(operation).await),
            None => None,
        }
    }

    /// Serve panel events forever.
    ///
    /// While a power-on or brew runs, instant commands keep being applied
    /// (so power-off can cut it short) and further long commands are
    /// dropped.
    pub async fn serve<const N: usize>(&self, events: &Channel<M, PanelEvent, N>) {
        loop {
            let event = events.receive().await;
            let Some(operation) = self.dispatch(event) else {
                continue;
            };

            let mut running = pin!(self.execute(operation));
            loop {
                match select(running.as_mut(), events.receive()).await {
                    Either::First(_outcome) => {
                        #[cfg(feature = "defmt")]
                        defmt::info!("{} finished: {}", operation, _outcome);
                        break;
                    }
                    Either::Second(event) => {
                        if let Some(_dropped) = self.dispatch(event) {
                            #[cfg(feature = "defmt")]
                            defmt::debug!("{} dropped: {}", _dropped, Rejection::Busy);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MachineConfig;
    use crate::ingredients::IngredientLevels;
    use crate::state::State;
    use crate::testing::{rig, ticks};
    use crema_protocol::Ingredient;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    type Events = Channel<NoopRawMutex, PanelEvent, 8>;

    #[test]
    fn test_brew_without_selection_is_ignored() {
        let (machine, _clock, delay) = rig(MachineConfig::default());
        block_on(machine.power_on());
        delay.clear();

        assert_eq!(block_on(machine.handle(PanelEvent::Brew(ServingSize::Cup))), None);
        assert!(delay.waits().is_empty());
        assert_eq!(machine.snapshot().record.total_cups, 0);
    }

    #[test]
    fn test_handle_power_toggle_and_brew() {
        let (machine, _clock, _delay) = rig(MachineConfig::default());

        let on = block_on(machine.handle(PanelEvent::PowerToggle));
        assert!(matches!(on, Some(Outcome::Power(PowerOutcome::Ready { .. }))));

        block_on(machine.handle(PanelEvent::SelectBeverage(Some(Beverage::Coffee))));
        let brew = block_on(machine.handle(PanelEvent::Brew(ServingSize::Carafe)));
        assert!(matches!(
            brew,
            Some(Outcome::Brew(BrewOutcome::Completed { cups: 4, .. }))
        ));

        assert_eq!(block_on(machine.handle(PanelEvent::PowerToggle)), None);
        assert!(!machine.is_on());
        assert!(machine.snapshot().record.properly_shutdown);
    }

    #[test]
    fn test_instant_commands() {
        let (machine, _clock, _delay) = rig(MachineConfig::default());

        machine.dispatch(PanelEvent::SetLevel {
            ingredient: Ingredient::Water,
            level: 30,
        });
        assert_eq!(machine.levels().water, 30);

        machine.dispatch(PanelEvent::RefillAll);
        assert_eq!(machine.levels(), IngredientLevels::FULL);

        machine.dispatch(PanelEvent::SelectBeverage(Some(Beverage::Latte)));
        assert_eq!(machine.selection(), Some(Beverage::Latte));
        machine.dispatch(PanelEvent::SelectBeverage(None));
        assert_eq!(machine.selection(), None);
    }

    #[test]
    fn test_serve_power_toggle_cuts_brew_short() {
        let (machine, _clock, _delay) = rig(MachineConfig::default());
        block_on(machine.power_on());
        machine.select_beverage(Some(Beverage::Coffee));

        let events = Events::new();
        let _ = events.try_send(PanelEvent::Brew(ServingSize::Cup));

        let result = block_on(select(machine.serve(&events), async {
            ticks(1).await;
            let _ = events.try_send(PanelEvent::PowerToggle);
            ticks(4).await;
        }));
        assert!(matches!(result, Either::Second(())));

        let snap = machine.snapshot();
        assert_eq!(snap.state, State::Off);
        assert_eq!(snap.record.total_cups, 0);
        assert!(!snap.record.properly_shutdown);
        assert!(!snap.flags.operating);

        // the runner was released, so the machine can start again
        assert!(matches!(
            block_on(machine.power_on()),
            PowerOutcome::Ready { purged: true, .. }
        ));
    }

    #[test]
    fn test_serve_drops_overlapping_brew_and_applies_refill() {
        let (machine, _clock, _delay) = rig(MachineConfig::default());
        block_on(machine.power_on());
        machine.select_beverage(Some(Beverage::Coffee));

        let events = Events::new();
        let _ = events.try_send(PanelEvent::Brew(ServingSize::Cup));

        // both arrive while the cup is still grinding
        block_on(select(machine.serve(&events), async {
            let _ = events.try_send(PanelEvent::Brew(ServingSize::Carafe));
            let _ = events.try_send(PanelEvent::RefillAll);
            ticks(4).await;
        }));

        let snap = machine.snapshot();
        assert_eq!(snap.record.total_cups, 1);
        assert_eq!(snap.levels, IngredientLevels::FULL);
        assert_eq!(snap.state, State::Ready);
    }
}
