//! Collaborator traits
//!
//! These traits define the interface between the machine logic and the
//! panel and timebase it runs against.

pub mod clock;
pub mod surface;

pub use clock::Clock;
pub use surface::ControlSurface;
