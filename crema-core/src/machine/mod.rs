//! Coffee machine context
//!
//! `CoffeeMachine` owns every piece of machine state and the collaborators
//! it drives. Instant commands (refill, selection, level changes, power-off)
//! take effect immediately; power-on and brewing are async sequences that
//! hold the process runner for their whole duration.

mod brew;
mod panel;
mod power;
pub mod record;

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;

use crema_protocol::{Beverage, Ingredient, ServingSize};

use crate::config::MachineConfig;
use crate::ingredients::{IngredientLevels, IngredientStore, Recipe, Shortfall};
use crate::process::{Aborted, PhaseStep, ProcessRunner};
use crate::state::{Event, State};
use crate::time::ElapsedTime;
use crate::traits::{Clock, ControlSurface};

pub use panel::{Operation, Outcome};
pub use record::{MachineRecord, MachineSnapshot, OperationFlags};

/// Why a command was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rejection {
    /// Machine is switched off
    PoweredOff,
    /// Power-on requested while already on
    AlreadyOn,
    /// Another sequence is running
    Busy,
    /// Brew button pressed with no beverage selected
    NoSelection,
}

/// Result of a power-on request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerOutcome {
    /// Heated up and ready to brew
    Ready { purged: bool, elapsed: ElapsedTime },
    Ignored(Rejection),
    /// Switched off before heating finished
    Aborted,
}

/// Result of a brew request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BrewOutcome {
    Completed { cups: u8, elapsed: ElapsedTime },
    /// Not enough of an ingredient; nothing was consumed
    Refused(Shortfall),
    Ignored(Rejection),
    /// Switched off mid-brew
    Aborted,
}

struct Shared {
    state: State,
    record: MachineRecord,
    flags: OperationFlags,
    store: IngredientStore,
    selection: Option<Beverage>,
    chamber: u16,
    dispenser: u16,
    last_elapsed: ElapsedTime,
}

/// The whole machine
pub struct CoffeeMachine<M: RawMutex, S, D, C> {
    config: MachineConfig,
    surface: S,
    clock: C,
    shared: BlockingMutex<M, RefCell<Shared>>,
    runner: Mutex<M, ProcessRunner<D>>,
    abort: Signal<M, ()>,
}

impl<M, S, D, C> CoffeeMachine<M, S, D, C>
where
    M: RawMutex,
    S: ControlSurface,
    D: DelayNs,
    C: Clock,
{
    /// Machine switched off, reservoirs full, no cups made
    pub fn new(config: MachineConfig, surface: S, delay: D, clock: C) -> Self {
        Self::with_store(config, surface, delay, clock, IngredientStore::new())
    }

    pub fn with_store(
        config: MachineConfig,
        surface: S,
        delay: D,
        clock: C,
        store: IngredientStore,
    ) -> Self {
        Self {
            config,
            surface,
            clock,
            shared: BlockingMutex::new(RefCell::new(Shared {
                state: State::Off,
                record: MachineRecord::new(),
                flags: OperationFlags::default(),
                store,
                selection: None,
                chamber: 0,
                dispenser: 0,
                last_elapsed: ElapsedTime::ZERO,
            })),
            runner: Mutex::new(ProcessRunner::new(delay)),
            abort: Signal::new(),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Shared) -> R) -> R {
        self.shared.lock(|cell| f(&mut cell.borrow_mut()))
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_on(&self) -> bool {
        self.with(|s| s.flags.machine_on)
    }

    pub fn is_operating(&self) -> bool {
        self.with(|s| s.flags.operating)
    }

    pub fn state(&self) -> State {
        self.with(|s| s.state)
    }

    pub fn selection(&self) -> Option<Beverage> {
        self.with(|s| s.selection)
    }

    pub fn levels(&self) -> IngredientLevels {
        self.with(|s| s.store.levels())
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        self.with(|s| MachineSnapshot {
            state: s.state,
            record: s.record,
            flags: s.flags,
            levels: s.store.levels(),
            selection: s.selection,
            chamber: s.chamber,
            dispenser: s.dispenser,
            last_elapsed: s.last_elapsed,
        })
    }

    /// Push the full readout to the panel, e.g. after the link comes up
    pub fn refresh_panel(&self) {
        let snap = self.snapshot();
        self.surface.show_power(snap.flags.machine_on);
        self.surface.show_levels(snap.levels);
        self.surface.show_total_cups(snap.record.total_cups);
        self.surface.show_elapsed(snap.last_elapsed);
        self.surface.set_fill(snap.chamber, snap.dispenser);
        for phase in crema_protocol::Phase::ALL {
            self.surface
                .set_indicator(phase, snap.state.active_phase() == Some(phase));
        }
    }

    /// Whether the reservoirs hold enough for this order right now
    pub fn can_make(&self, beverage: Beverage, serving: ServingSize) -> bool {
        let recipe = Recipe::for_order(beverage, serving, &self.config);
        self.with(|s| s.store.check_sufficient(&recipe))
    }

    /// Fill every reservoir. Allowed at any time.
    pub fn refill(&self) {
        let levels = self.with(|s| {
            s.store.refill();
            s.store.levels()
        });
        self.surface.show_levels(levels);
    }

    /// Move one ingredient slider. Refused while a sequence runs so a
    /// checked recipe cannot go short halfway through.
    pub fn adjust_level(&self, ingredient: Ingredient, level: u8) -> Result<u8, Rejection> {
        let result = self.with(|s| {
            if s.flags.operating {
                return Err(Rejection::Busy);
            }
            let applied = s.store.set_level(ingredient, level);
            Ok((applied, s.store.levels()))
        });

        match result {
            Ok((applied, levels)) => {
                self.surface.show_levels(levels);
                Ok(applied)
            }
            Err(rejection) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("level change for {} ignored: {}", ingredient, rejection);
                Err(rejection)
            }
        }
    }

    /// Beverage radio group changed
    pub fn select_beverage(&self, beverage: Option<Beverage>) {
        self.with(|s| s.selection = beverage);
    }

    /// Record the gauges, run one phase, then advance the state machine
    async fn run_step(
        &self,
        runner: &mut ProcessRunner<D>,
        step: &PhaseStep,
    ) -> Result<(), Aborted> {
        self.with(|s| {
            s.chamber = step.chamber;
            s.dispenser = step.dispenser;
        });
        runner.run(&self.surface, step, &self.abort).await?;
        self.with(|s| s.state = s.state.transition(Event::PhaseComplete));
        Ok(())
    }

    /// Close a sequence: apply `f`, clear the operating flag and publish
    /// how long it took
    fn finish(&self, started_ms: u64, f: impl FnOnce(&mut Shared)) -> ElapsedTime {
        let elapsed = ElapsedTime::between(started_ms, self.clock.now_ms());
        self.with(|s| {
            f(s);
            s.flags.operating = false;
            s.last_elapsed = elapsed;
        });
        self.surface.show_elapsed(elapsed);
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{rig, SurfaceCall};
    use embassy_futures::block_on;

    #[test]
    fn test_new_machine_is_off_and_full() {
        let (machine, _clock, _delay) = rig(MachineConfig::default());
        let snap = machine.snapshot();

        assert_eq!(snap.state, State::Off);
        assert_eq!(snap.record, MachineRecord::new());
        assert!(snap.record.properly_shutdown);
        assert_eq!(snap.flags, OperationFlags::default());
        assert_eq!(snap.levels, IngredientLevels::FULL);
        assert_eq!(snap.selection, None);
        assert_eq!(snap.last_elapsed, ElapsedTime::ZERO);
    }

    #[test]
    fn test_refill_allowed_while_off() {
        let (machine, _clock, _delay) = rig(MachineConfig::default());
        machine.adjust_level(Ingredient::Water, 10).unwrap();
        machine.refill();

        assert_eq!(machine.levels(), IngredientLevels::FULL);
        assert_eq!(
            machine.surface().last(),
            Some(SurfaceCall::Levels(IngredientLevels::FULL))
        );
    }

    #[test]
    fn test_adjust_level_clamps_and_shows() {
        let (machine, _clock, _delay) = rig(MachineConfig::default());

        assert_eq!(machine.adjust_level(Ingredient::Beans, 140), Ok(100));
        assert_eq!(machine.adjust_level(Ingredient::Milk, 7), Ok(7));
        assert_eq!(machine.levels().milk, 7);
    }

    #[test]
    fn test_can_make_tracks_levels() {
        let (machine, _clock, _delay) = rig(MachineConfig::default());
        machine.adjust_level(Ingredient::Milk, 19).unwrap();

        assert!(machine.can_make(Beverage::Latte, ServingSize::Cup));
        assert!(!machine.can_make(Beverage::Latte, ServingSize::Carafe));
        assert!(machine.can_make(Beverage::Coffee, ServingSize::Carafe));
    }

    #[test]
    fn test_refresh_panel_after_power_on() {
        let (machine, _clock, _delay) = rig(MachineConfig::default());
        block_on(machine.power_on());
        machine.surface().clear();

        machine.refresh_panel();

        let calls = machine.surface().calls();
        assert_eq!(calls[0], SurfaceCall::Power(true));
        assert_eq!(calls[1], SurfaceCall::Levels(IngredientLevels::FULL));
        assert_eq!(calls[2], SurfaceCall::TotalCups(0));
        assert!(calls.contains(&SurfaceCall::Indicator(crema_protocol::Phase::Heating, false)));
    }
}
