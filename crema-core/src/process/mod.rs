//! Timed phase execution

pub mod runner;

pub use runner::{Aborted, PhaseStep, ProcessRunner};
