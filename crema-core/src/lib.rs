//! Board-agnostic core logic for the espresso machine controller
//!
//! This crate contains all machine logic that does not depend on the
//! board or the panel link:
//!
//! - Control surface and clock traits
//! - Ingredient store and recipes
//! - Phase runner and brew/power sequencing
//! - Machine state machine
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod ingredients;
pub mod machine;
pub mod process;
pub mod sequencer;
pub mod state;
pub mod time;
pub mod traits;

#[cfg(test)]
mod testing;

pub use crema_protocol::{Beverage, Ingredient, Phase, ServingSize};
