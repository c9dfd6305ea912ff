//! Brew sequencer

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crema_protocol::{Beverage, ServingSize};

use crate::config::ConsumptionPolicy;
use crate::sequencer::BrewPlan;
use crate::state::Event;
use crate::traits::{Clock, ControlSurface};

use super::{BrewOutcome, CoffeeMachine, Rejection};

impl<M, S, D, C> CoffeeMachine<M, S, D, C>
where
    M: RawMutex,
    S: ControlSurface,
    D: DelayNs,
    C: Clock,
{
    /// Make one serving of `beverage`.
    ///
    /// Ignored when the machine is off or another sequence runs. Ingredients
    /// are taken at each phase boundary; cups are only counted once the
    /// last phase has finished.
    pub async fn prepare_beverage(&self, beverage: Beverage, serving: ServingSize) -> BrewOutcome {
        if !self.is_on() {
            return BrewOutcome::Ignored(Rejection::PoweredOff);
        }
        let Ok(mut runner) = self.runner.try_lock() else {
            #[cfg(feature = "defmt")]
            defmt::debug!("brew ignored, a sequence is running");
            return BrewOutcome::Ignored(Rejection::Busy);
        };
        // on and holding the runner means no sequence is mid-flight
        debug_assert!(self.state().accepts_brew());
        self.abort.reset();

        let plan = BrewPlan::new(beverage, serving, &self.config);

        if self.config.consumption == ConsumptionPolicy::Gated {
            if let Err(shortfall) = self.with(|s| s.store.check(plan.recipe())) {
                #[cfg(feature = "defmt")]
                defmt::warn!("brew refused: {}", shortfall);
                self.surface.report_shortfall(shortfall);
                return BrewOutcome::Refused(shortfall);
            }
        }

        #[cfg(feature = "defmt")]
        defmt::info!("brewing {} ({})", beverage, serving);

        let started = self.clock.now_ms();
        self.with(|s| {
            s.flags.operating = true;
            s.state = s.state.transition(Event::Brew(beverage));
        });

        for planned in plan.steps() {
            if !planned.consumes.is_empty() {
                let levels = self.with(|s| {
                    for &(ingredient, amount) in &planned.consumes {
                        if let Err(_shortfall) = s.store.consume(ingredient, amount) {
                            #[cfg(feature = "defmt")]
                            defmt::warn!("{} ran short, continuing", _shortfall.ingredient);
                        }
                    }
                    s.store.levels()
                });
                self.surface.show_levels(levels);
            }

            if self.run_step(&mut runner, &planned.step).await.is_err() {
                return BrewOutcome::Aborted;
            }
        }

        let cups = plan.cups();
        let total = self.with(|s| {
            s.record.total_cups = s.record.total_cups.saturating_add(cups as u32);
            s.record.total_cups
        });
        self.surface.show_total_cups(total);

        let elapsed = self.finish(started, |_| {});
        BrewOutcome::Completed { cups, elapsed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MachineConfig;
    use crate::ingredients::{IngredientLevels, Shortfall};
    use crate::machine::PowerOutcome;
    use crate::state::State;
    use crate::testing::{rig, ticks, SimClock, SimDelay, SurfaceCall, TestMachine};
    use crate::time::ElapsedTime;
    use crema_protocol::{Ingredient, Phase};
    use embassy_futures::block_on;
    use embassy_futures::join::join;

    fn ready(config: MachineConfig) -> (TestMachine, SimClock, SimDelay) {
        let (machine, clock, delay) = rig(config);
        block_on(machine.power_on());
        delay.clear();
        machine.surface().clear();
        (machine, clock, delay)
    }

    #[test]
    fn test_hot_water_cup() {
        let (machine, _clock, delay) = ready(MachineConfig::default());

        let outcome = block_on(machine.prepare_beverage(Beverage::HotWater, ServingSize::Cup));

        assert_eq!(
            outcome,
            BrewOutcome::Completed {
                cups: 1,
                elapsed: ElapsedTime::from_millis(3000),
            }
        );
        assert_eq!(delay.waits(), vec![3000]);
        assert_eq!(machine.levels().water, 95);
        assert_eq!(machine.levels().beans, 100);
        assert_eq!(machine.snapshot().record.total_cups, 1);
        assert_eq!(machine.state(), State::Ready);
        assert!(machine.surface().calls().contains(&SurfaceCall::Fill(0, 5)));
        assert!(machine.surface().calls().contains(&SurfaceCall::TotalCups(1)));
    }

    #[test]
    fn test_latte_carafe() {
        let (machine, _clock, delay) = ready(MachineConfig::default());

        let outcome = block_on(machine.prepare_beverage(Beverage::Latte, ServingSize::Carafe));

        assert!(matches!(outcome, BrewOutcome::Completed { cups: 4, .. }));
        assert_eq!(delay.waits(), vec![2000, 3000, 3000]);
        assert_eq!(
            machine.levels(),
            IngredientLevels {
                water: 80,
                beans: 80,
                milk: 80,
            }
        );
        assert_eq!(machine.snapshot().record.total_cups, 4);

        let fills: Vec<_> = machine
            .surface()
            .calls()
            .into_iter()
            .filter(|c| matches!(c, SurfaceCall::Fill(..)))
            .collect();
        assert_eq!(
            fills,
            vec![
                SurfaceCall::Fill(20, 0),
                SurfaceCall::Fill(60, 0),
                SurfaceCall::Fill(0, 60),
            ]
        );
        assert_eq!(
            machine.surface().indicator_history(),
            vec![
                (Phase::Grinding, true),
                (Phase::Grinding, false),
                (Phase::Brewing, true),
                (Phase::Brewing, false),
                (Phase::Dispensing, true),
                (Phase::Dispensing, false),
            ]
        );
    }

    #[test]
    fn test_coffee_cup_elapsed_readout() {
        let (machine, _clock, _delay) = ready(MachineConfig::default());

        let outcome = block_on(machine.prepare_beverage(Beverage::Coffee, ServingSize::Cup));

        let BrewOutcome::Completed { elapsed, .. } = outcome else {
            panic!("unexpected outcome {:?}", outcome);
        };
        assert_eq!(elapsed.to_string(), "00:08");
        assert_eq!(machine.snapshot().last_elapsed, elapsed);
        assert_eq!(machine.levels().milk, 100);
    }

    #[test]
    fn test_brew_while_off_is_ignored() {
        let (machine, _clock, delay) = rig(MachineConfig::default());

        let outcome = block_on(machine.prepare_beverage(Beverage::Coffee, ServingSize::Cup));

        assert_eq!(outcome, BrewOutcome::Ignored(Rejection::PoweredOff));
        assert!(delay.waits().is_empty());
        assert!(machine.surface().calls().is_empty());
        assert_eq!(machine.levels(), IngredientLevels::FULL);
    }

    #[test]
    fn test_brew_while_operating_is_a_no_op() {
        let (machine, _clock, _delay) = ready(MachineConfig::default());

        let (first, second) = block_on(join(
            machine.prepare_beverage(Beverage::Coffee, ServingSize::Cup),
            machine.prepare_beverage(Beverage::Latte, ServingSize::Carafe),
        ));

        assert!(matches!(first, BrewOutcome::Completed { cups: 1, .. }));
        assert_eq!(second, BrewOutcome::Ignored(Rejection::Busy));
        assert_eq!(machine.snapshot().record.total_cups, 1);
        assert_eq!(machine.levels().milk, 100);
        assert_eq!(machine.levels().beans, 95);
    }

    #[test]
    fn test_level_change_refused_mid_brew() {
        let (machine, _clock, _delay) = ready(MachineConfig::default());

        let (outcome, adjusted) = block_on(join(
            machine.prepare_beverage(Beverage::Coffee, ServingSize::Cup),
            async { machine.adjust_level(Ingredient::Water, 0) },
        ));

        assert_eq!(adjusted, Err(Rejection::Busy));
        assert!(matches!(outcome, BrewOutcome::Completed { cups: 1, .. }));
        // only the brew itself took water
        assert_eq!(machine.levels().water, 95);
        assert_eq!(machine.levels().beans, 95);
    }

    #[test]
    fn test_brew_during_heating_is_busy() {
        let (machine, _clock, delay) = rig(MachineConfig::default());

        let (power, brew) = block_on(join(
            machine.power_on(),
            machine.prepare_beverage(Beverage::Latte, ServingSize::Cup),
        ));

        assert!(matches!(power, PowerOutcome::Ready { .. }));
        assert_eq!(brew, BrewOutcome::Ignored(Rejection::Busy));
        assert_eq!(delay.waits(), vec![3000]);
        assert_eq!(machine.levels(), IngredientLevels::FULL);
        assert_eq!(machine.snapshot().record.total_cups, 0);
    }

    #[test]
    fn test_gated_brew_refuses_on_shortfall() {
        let (machine, _clock, delay) = ready(MachineConfig::default());
        machine.adjust_level(Ingredient::Milk, 12).unwrap();
        machine.surface().clear();

        let outcome = block_on(machine.prepare_beverage(Beverage::Latte, ServingSize::Carafe));

        let shortfall = Shortfall {
            ingredient: Ingredient::Milk,
            required: 20,
            available: 12,
        };
        assert_eq!(outcome, BrewOutcome::Refused(shortfall));
        assert!(delay.waits().is_empty());
        assert_eq!(
            machine.levels(),
            IngredientLevels {
                water: 100,
                beans: 100,
                milk: 12,
            }
        );
        assert_eq!(machine.surface().calls(), vec![SurfaceCall::Shortfall(shortfall)]);
        assert!(!machine.is_operating());
        assert_eq!(machine.state(), State::Ready);
    }

    #[test]
    fn test_lenient_brew_consumes_what_it_can() {
        let config = MachineConfig {
            consumption: ConsumptionPolicy::Lenient,
            ..MachineConfig::default()
        };
        let (machine, _clock, _delay) = ready(config);
        machine.adjust_level(Ingredient::Milk, 12).unwrap();

        let outcome = block_on(machine.prepare_beverage(Beverage::Latte, ServingSize::Carafe));

        assert!(matches!(outcome, BrewOutcome::Completed { cups: 4, .. }));
        assert_eq!(
            machine.levels(),
            IngredientLevels {
                water: 80,
                beans: 80,
                milk: 12,
            }
        );
        // gauges still show the requested volume
        assert!(machine.surface().calls().contains(&SurfaceCall::Fill(60, 0)));
    }

    #[test]
    fn test_power_off_mid_brew_aborts() {
        let (machine, _clock, delay) = ready(MachineConfig::default());

        let (outcome, ()) = block_on(join(
            machine.prepare_beverage(Beverage::Latte, ServingSize::Cup),
            async {
                // let grinding finish and brewing start
                ticks(1).await;
                machine.power_off();
            },
        ));

        assert_eq!(outcome, BrewOutcome::Aborted);
        assert_eq!(delay.waits(), vec![2000, 3000]);

        let snap = machine.snapshot();
        assert_eq!(snap.state, State::Off);
        assert!(!snap.record.properly_shutdown);
        assert_eq!(snap.record.total_cups, 0);
        assert!(!snap.flags.operating);
        assert_eq!(
            snap.levels,
            IngredientLevels {
                water: 95,
                beans: 95,
                milk: 95,
            }
        );
        // nothing touched the panel after the reset
        assert_eq!(
            machine.surface().last(),
            Some(SurfaceCall::Levels(snap.levels))
        );
    }

    #[test]
    fn test_power_off_mid_brew_without_cancel_lets_it_finish() {
        let config = MachineConfig {
            cancel_on_power_off: false,
            ..MachineConfig::default()
        };
        let (machine, _clock, _delay) = ready(config);

        let (outcome, ()) = block_on(join(
            machine.prepare_beverage(Beverage::Coffee, ServingSize::Cup),
            async {
                machine.power_off();
            },
        ));

        assert!(matches!(outcome, BrewOutcome::Completed { cups: 1, .. }));
        let snap = machine.snapshot();
        assert_eq!(snap.state, State::Off);
        assert!(!snap.record.properly_shutdown);
        assert_eq!(snap.record.total_cups, 1);
        assert_eq!(snap.levels.water, 95);
    }
}
