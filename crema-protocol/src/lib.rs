//! Crema control panel link
//!
//! The front panel (buttons, sliders, indicator lamps, the small status
//! display) talks to the machine controller over a UART. Every message is
//! carried in one frame:
//!
//! ```text
//! ┌───────┬────────┬──────┬─────────────┬──────────┐
//! │ START │ LENGTH │ KIND │ PAYLOAD     │ CHECKSUM │
//! │ 1B    │ 1B     │ 1B   │ 0–8B        │ 1B       │
//! └───────┴────────┴──────┴─────────────┴──────────┘
//! ```
//!
//! The panel only reports what the user did and draws what it is told.
//! Ingredient accounting, timing and sequencing all live on the controller.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;
pub mod types;

pub use frame::{Frame, FrameDecoder, FrameError, FRAME_START, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use messages::{PanelEvent, PanelMessage, PanelUpdate};
pub use types::{Beverage, Ingredient, Phase, ServingSize};
