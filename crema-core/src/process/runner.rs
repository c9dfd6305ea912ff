//! Process runner
//!
//! Runs one timed phase: light the indicator, set the gauges, wait, clear
//! the indicator. The wait is the only suspension point of a sequence and
//! can be cut short by the abort signal.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;

use crema_protocol::Phase;

use crate::traits::ControlSurface;

/// One phase of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseStep {
    pub phase: Phase,
    pub duration_ms: u32,
    /// Brew chamber gauge while the phase runs
    pub chamber: u16,
    /// Dispenser gauge while the phase runs
    pub dispenser: u16,
}

/// The phase was cancelled before its duration elapsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Aborted;

/// Owns the delay source. Whoever holds the runner is the active sequence.
pub struct ProcessRunner<D> {
    delay: D,
}

impl<D: DelayNs> ProcessRunner<D> {
    pub const fn new(delay: D) -> Self {
        Self { delay }
    }

    /// Run a single phase to completion or until `abort` fires.
    ///
    /// On abort the indicator is left as is; the caller that raised the
    /// abort owns resetting the surface.
    pub async fn run<M: RawMutex, S: ControlSurface>(
        &mut self,
        surface: &S,
        step: &PhaseStep,
        abort: &Signal<M, ()>,
    ) -> Result<(), Aborted> {
        #[cfg(feature = "defmt")]
        defmt::debug!("phase {} for {} ms", step.phase, step.duration_ms);

        surface.set_indicator(step.phase, true);
        surface.set_fill(step.chamber, step.dispenser);

        match select(abort.wait(), self.delay.delay_ms(step.duration_ms)).await {
            Either::First(()) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("phase {} aborted", step.phase);
                Err(Aborted)
            }
            Either::Second(()) => {
                surface.set_indicator(step.phase, false);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSurface, SimClock, SimDelay, SurfaceCall};
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    const GRIND: PhaseStep = PhaseStep {
        phase: Phase::Grinding,
        duration_ms: 2000,
        chamber: 20,
        dispenser: 0,
    };

    #[test]
    fn test_phase_runs_for_its_duration() {
        let clock = SimClock::new();
        let delay = SimDelay::new(&clock);
        let mut runner = ProcessRunner::new(delay.clone());
        let surface = RecordingSurface::new();
        let abort = Signal::<NoopRawMutex, ()>::new();

        let result = block_on(runner.run(&surface, &GRIND, &abort));

        assert_eq!(result, Ok(()));
        assert_eq!(delay.waits(), vec![2000]);
        assert_eq!(clock.now(), 2000);
        assert_eq!(
            surface.calls(),
            vec![
                SurfaceCall::Indicator(Phase::Grinding, true),
                SurfaceCall::Fill(20, 0),
                SurfaceCall::Indicator(Phase::Grinding, false),
            ]
        );
    }

    #[test]
    fn test_abort_leaves_indicator_alone() {
        let clock = SimClock::new();
        let mut runner = ProcessRunner::new(SimDelay::new(&clock));
        let surface = RecordingSurface::new();
        let abort = Signal::<NoopRawMutex, ()>::new();

        let (result, ()) = block_on(join(runner.run(&surface, &GRIND, &abort), async {
            abort.signal(());
        }));

        assert_eq!(result, Err(Aborted));
        assert!(!surface
            .calls()
            .contains(&SurfaceCall::Indicator(Phase::Grinding, false)));
    }

    #[test]
    fn test_pending_abort_wins_over_delay() {
        let clock = SimClock::new();
        let mut runner = ProcessRunner::new(SimDelay::new(&clock));
        let surface = RecordingSurface::new();
        let abort = Signal::<NoopRawMutex, ()>::new();
        abort.signal(());

        assert_eq!(block_on(runner.run(&surface, &GRIND, &abort)), Err(Aborted));
    }
}
