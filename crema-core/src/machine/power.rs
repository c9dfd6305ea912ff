//! Power controller

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::sequencer::power_on_steps;
use crate::state::Event;
use crate::time::ElapsedTime;
use crate::traits::{Clock, ControlSurface};

use super::{CoffeeMachine, PowerOutcome, Rejection};

impl<M, S, D, C> CoffeeMachine<M, S, D, C>
where
    M: RawMutex,
    S: ControlSurface,
    D: DelayNs,
    C: Clock,
{
    /// Switch on: purge if the last session ended mid-sequence, then heat.
    pub async fn power_on(&self) -> PowerOutcome {
        if self.is_on() {
            return PowerOutcome::Ignored(Rejection::AlreadyOn);
        }
        let Ok(mut runner) = self.runner.try_lock() else {
            #[cfg(feature = "defmt")]
            defmt::debug!("power-on ignored, a sequence is still running");
            return PowerOutcome::Ignored(Rejection::Busy);
        };
        self.abort.reset();

        let started = self.clock.now_ms();
        let clean = self.with(|s| {
            s.flags.machine_on = true;
            s.flags.operating = true;
            let clean = s.record.properly_shutdown;
            s.state = s.state.transition(Event::PowerOn {
                clean_shutdown: clean,
            });
            clean
        });

        #[cfg(feature = "defmt")]
        defmt::info!("powering on (clean shutdown: {})", clean);

        self.surface.show_power(true);

        for step in power_on_steps(clean, &self.config) {
            if self.run_step(&mut runner, &step).await.is_err() {
                return PowerOutcome::Aborted;
            }
        }

        let elapsed = self.finish(started, |s| s.record.properly_shutdown = false);
        PowerOutcome::Ready {
            purged: !clean,
            elapsed,
        }
    }

    /// Switch off immediately. Always succeeds.
    ///
    /// Switching off mid-sequence is recorded as an unclean shutdown and,
    /// when `cancel_on_power_off` is set, abandons the running sequence.
    pub fn power_off(&self) {
        let was_operating = self.with(|s| {
            let was_operating = s.flags.operating;
            s.record.properly_shutdown = !was_operating;
            s.flags.machine_on = false;
            s.flags.operating = false;
            s.state = s.state.transition(Event::PowerOff);
            s.selection = None;
            s.chamber = 0;
            s.dispenser = 0;
            s.last_elapsed = ElapsedTime::ZERO;
            was_operating
        });

        if was_operating && self.config.cancel_on_power_off {
            self.abort.signal(());
        }

        #[cfg(feature = "defmt")]
        defmt::info!("powered off (mid-sequence: {})", was_operating);

        self.surface.show_power(false);
        self.surface.clear_indicators();
        self.surface.clear_selection();
        self.surface.show_elapsed(ElapsedTime::ZERO);
        self.surface.set_fill(0, 0);
        self.surface.show_levels(self.levels());
    }
}
