//! Configuration types
//!
//! Timings and doses for the brewing sequence. The firmware parses these
//! from its embedded `machine.toml`; host code and tests use the defaults.

pub mod toml;
pub mod types;

pub use toml::{parse_config, ParseError};
pub use types::*;
