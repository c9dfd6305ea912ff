//! Machine state machine
//!
//! Defines the authoritative lifecycle of the machine.
//! The state machine is explicit, finite, and deterministic.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::State;
