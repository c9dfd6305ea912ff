//! Elapsed-time readout

use core::fmt;

/// Wall-clock duration of a completed sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ElapsedTime {
    millis: u64,
}

impl ElapsedTime {
    pub const ZERO: Self = Self { millis: 0 };

    pub const fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    /// Time between two clock readings; zero if the clock went backwards
    pub fn between(start_ms: u64, end_ms: u64) -> Self {
        Self::from_millis(end_ms.saturating_sub(start_ms))
    }

    pub const fn as_millis(&self) -> u64 {
        self.millis
    }

    pub const fn as_secs(&self) -> u64 {
        self.millis / 1000
    }

    pub const fn minutes(&self) -> u64 {
        self.as_secs() / 60
    }

    pub const fn seconds(&self) -> u64 {
        self.as_secs() % 60
    }

    /// Whole seconds for the panel readout, saturating
    pub fn panel_seconds(&self) -> u16 {
        u16::try_from(self.as_secs()).unwrap_or(u16::MAX)
    }
}

/// `MM:SS`, zero padded; minutes keep growing past 99
impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes(), self.seconds())
    }
}
