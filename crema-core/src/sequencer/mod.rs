//! Brew and power-on sequencing
//!
//! Turns an order or a power-on into the ordered list of phases to run and
//! the ingredients to take before each one.

pub mod plan;

pub use plan::{power_on_steps, BrewPlan, PlannedStep};
