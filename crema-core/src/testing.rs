//! Host-side fakes for driving the machine in tests

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embedded_hal_async::delay::DelayNs;

// links the std critical-section implementation into the test binary
use critical_section as _;

use crema_protocol::Phase;

use crate::config::MachineConfig;
use crate::ingredients::{IngredientLevels, Shortfall};
use crate::machine::CoffeeMachine;
use crate::time::ElapsedTime;
use crate::traits::{Clock, ControlSurface};

pub type TestMachine = CoffeeMachine<NoopRawMutex, RecordingSurface, SimDelay, SimClock>;

/// Build a switched-off machine on simulated time
pub fn rig(config: MachineConfig) -> (TestMachine, SimClock, SimDelay) {
    let clock = SimClock::new();
    let delay = SimDelay::new(&clock);
    let machine = CoffeeMachine::new(config, RecordingSurface::new(), delay.clone(), clock.clone());
    (machine, clock, delay)
}

/// Give other futures in a `join`/`select` `n` chances to run
pub async fn ticks(n: usize) {
    for _ in 0..n {
        yield_now().await;
    }
}

/// Manually advanced millisecond clock
#[derive(Clone, Default)]
pub struct SimClock(Rc<Cell<u64>>);

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.0.get()
    }

    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.now()
    }
}

/// Delay that jumps the clock forward and yields once instead of sleeping
#[derive(Clone)]
pub struct SimDelay {
    clock: SimClock,
    waits: Rc<RefCell<Vec<u32>>>,
}

impl SimDelay {
    pub fn new(clock: &SimClock) -> Self {
        Self {
            clock: clock.clone(),
            waits: Rc::default(),
        }
    }

    /// Every `delay_ms` request so far, in order
    pub fn waits(&self) -> Vec<u32> {
        self.waits.borrow().clone()
    }

    pub fn clear(&self) {
        self.waits.borrow_mut().clear();
    }
}

impl DelayNs for SimDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.clock.advance(u64::from(ns / 1_000_000));
        yield_now().await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.waits.borrow_mut().push(ms);
        self.clock.advance(u64::from(ms));
        yield_now().await;
    }
}

/// One write to the control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceCall {
    Indicator(Phase, bool),
    Fill(u16, u16),
    Levels(IngredientLevels),
    Elapsed(ElapsedTime),
    TotalCups(u32),
    Power(bool),
    SelectionCleared,
    Shortfall(Shortfall),
}

/// Control surface that records every write
#[derive(Default)]
pub struct RecordingSurface {
    calls: RefCell<Vec<SurfaceCall>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.borrow().clone()
    }

    pub fn last(&self) -> Option<SurfaceCall> {
        self.calls.borrow().last().copied()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Indicator writes made by running phases, ignoring bulk clears
    pub fn indicator_history(&self) -> Vec<(Phase, bool)> {
        let calls = self.calls.borrow();
        let mut history = Vec::new();
        let mut i = 0;
        while i < calls.len() {
            let is_bulk_clear = calls.len() - i >= Phase::ALL.len()
                && Phase::ALL
                    .iter()
                    .zip(&calls[i..])
                    .all(|(phase, call)| *call == SurfaceCall::Indicator(*phase, false));
            if is_bulk_clear {
                i += Phase::ALL.len();
                continue;
            }
            if let SurfaceCall::Indicator(phase, active) = calls[i] {
                history.push((phase, active));
            }
            i += 1;
        }
        history
    }

    fn record(&self, call: SurfaceCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl ControlSurface for RecordingSurface {
    fn set_indicator(&self, phase: Phase, active: bool) {
        self.record(SurfaceCall::Indicator(phase, active));
    }

    fn set_fill(&self, chamber: u16, dispenser: u16) {
        self.record(SurfaceCall::Fill(chamber, dispenser));
    }

    fn show_levels(&self, levels: IngredientLevels) {
        self.record(SurfaceCall::Levels(levels));
    }

    fn show_elapsed(&self, elapsed: ElapsedTime) {
        self.record(SurfaceCall::Elapsed(elapsed));
    }

    fn show_total_cups(&self, cups: u32) {
        self.record(SurfaceCall::TotalCups(cups));
    }

    fn show_power(&self, on: bool) {
        self.record(SurfaceCall::Power(on));
    }

    fn clear_selection(&self) {
        self.record(SurfaceCall::SelectionCleared);
    }

    fn report_shortfall(&self, shortfall: Shortfall) {
        self.record(SurfaceCall::Shortfall(shortfall));
    }
}
