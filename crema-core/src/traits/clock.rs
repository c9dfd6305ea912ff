//! Monotonic time source

/// Milliseconds since an arbitrary fixed point
///
/// Used only to measure how long a sequence took; phase timing goes through
/// the async delay.
pub trait Clock {
    fn now_ms(&self) -> u64;
}
