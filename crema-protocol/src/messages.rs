//! Panel link messages
//!
//! - Panel → controller: user input (`PanelEvent`) and heartbeat pings
//! - Controller → panel: indicator and readout updates (`PanelUpdate`)

use crate::frame::{Frame, FrameError};
use crate::types::{Beverage, Ingredient, Phase, ServingSize};

// Kinds: panel → controller
pub const MSG_POWER_TOGGLE: u8 = 0x01;
pub const MSG_BREW: u8 = 0x02;
pub const MSG_REFILL: u8 = 0x03;
pub const MSG_SELECT: u8 = 0x04;
pub const MSG_SET_LEVEL: u8 = 0x05;
pub const MSG_PING: u8 = 0x0F;

// Kinds: controller → panel
pub const MSG_INDICATOR: u8 = 0x20;
pub const MSG_FILL: u8 = 0x21;
pub const MSG_LEVELS: u8 = 0x22;
pub const MSG_ELAPSED: u8 = 0x23;
pub const MSG_TOTAL_CUPS: u8 = 0x24;
pub const MSG_POWER: u8 = 0x25;
pub const MSG_SELECTION_CLEARED: u8 = 0x26;
pub const MSG_SHORTFALL: u8 = 0x27;
pub const MSG_PONG: u8 = 0x2E;

/// No beverage selected
const SELECT_NONE: u8 = 0x00;

/// Something the user did on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelEvent {
    /// Power button
    PowerToggle,
    /// Cup or carafe button
    Brew(ServingSize),
    /// Refill-all button
    RefillAll,
    /// Beverage radio group; `None` when cleared
    SelectBeverage(Option<Beverage>),
    /// Ingredient slider moved
    SetLevel { ingredient: Ingredient, level: u8 },
}

/// Everything the panel can send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelMessage {
    Event(PanelEvent),
    /// Link heartbeat, answered with `PanelUpdate::Pong`
    Ping,
}

impl PanelMessage {
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        let body = frame.payload.as_slice();
        let event = match (frame.kind, body) {
            (MSG_PING, []) => return Ok(PanelMessage::Ping),
            (MSG_POWER_TOGGLE, []) => PanelEvent::PowerToggle,
            (MSG_BREW, [serving]) => PanelEvent::Brew(ServingSize::from_carafe(*serving != 0)),
            (MSG_REFILL, []) => PanelEvent::RefillAll,
            (MSG_SELECT, [SELECT_NONE]) => PanelEvent::SelectBeverage(None),
            (MSG_SELECT, [code]) => PanelEvent::SelectBeverage(Some(
                Beverage::from_byte(*code).ok_or(FrameError::UnknownMessage)?,
            )),
            (MSG_SET_LEVEL, [code, level]) => PanelEvent::SetLevel {
                ingredient: Ingredient::from_byte(*code).ok_or(FrameError::UnknownMessage)?,
                level: *level,
            },
            _ => return Err(FrameError::UnknownMessage),
        };
        Ok(PanelMessage::Event(event))
    }

    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            PanelMessage::Ping => Ok(Frame::bare(MSG_PING)),
            PanelMessage::Event(PanelEvent::PowerToggle) => Ok(Frame::bare(MSG_POWER_TOGGLE)),
            PanelMessage::Event(PanelEvent::Brew(serving)) => {
                Frame::new(MSG_BREW, &[serving.is_carafe() as u8])
            }
            PanelMessage::Event(PanelEvent::RefillAll) => Ok(Frame::bare(MSG_REFILL)),
            PanelMessage::Event(PanelEvent::SelectBeverage(beverage)) => {
                let code = beverage.map_or(SELECT_NONE, Beverage::to_byte);
                Frame::new(MSG_SELECT, &[code])
            }
            PanelMessage::Event(PanelEvent::SetLevel { ingredient, level }) => {
                Frame::new(MSG_SET_LEVEL, &[ingredient.to_byte(), *level])
            }
        }
    }
}

/// Readout and indicator changes pushed to the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelUpdate {
    Indicator { phase: Phase, active: bool },
    /// Chamber and dispenser gauges, in ingredient units
    Fill { chamber: u16, dispenser: u16 },
    Levels { water: u8, beans: u8, milk: u8 },
    /// Duration of the last completed sequence
    Elapsed { seconds: u16 },
    TotalCups(u32),
    /// Power button label
    Power { on: bool },
    /// Beverage radio group cleared
    SelectionCleared,
    /// A brew was refused for lack of an ingredient
    Shortfall {
        ingredient: Ingredient,
        required: u8,
        available: u8,
    },
    Pong,
}

impl PanelUpdate {
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match *self {
            PanelUpdate::Indicator { phase, active } => {
                Frame::new(MSG_INDICATOR, &[phase.to_byte(), active as u8])
            }
            PanelUpdate::Fill { chamber, dispenser } => {
                let [c0, c1] = chamber.to_le_bytes();
                let [d0, d1] = dispenser.to_le_bytes();
                Frame::new(MSG_FILL, &[c0, c1, d0, d1])
            }
            PanelUpdate::Levels { water, beans, milk } => {
                Frame::new(MSG_LEVELS, &[water, beans, milk])
            }
            PanelUpdate::Elapsed { seconds } => Frame::new(MSG_ELAPSED, &seconds.to_le_bytes()),
            PanelUpdate::TotalCups(cups) => Frame::new(MSG_TOTAL_CUPS, &cups.to_le_bytes()),
            PanelUpdate::Power { on } => Frame::new(MSG_POWER, &[on as u8]),
            PanelUpdate::SelectionCleared => Ok(Frame::bare(MSG_SELECTION_CLEARED)),
            PanelUpdate::Shortfall {
                ingredient,
                required,
                available,
            } => Frame::new(MSG_SHORTFALL, &[ingredient.to_byte(), required, available]),
            PanelUpdate::Pong => Ok(Frame::bare(MSG_PONG)),
        }
    }

    /// Parse an update (panel side, and for link tests)
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        let update = match (frame.kind, frame.payload.as_slice()) {
            (MSG_INDICATOR, [phase, active]) => PanelUpdate::Indicator {
                phase: Phase::from_byte(*phase).ok_or(FrameError::UnknownMessage)?,
                active: *active != 0,
            },
            (MSG_FILL, [c0, c1, d0, d1]) => PanelUpdate::Fill {
                chamber: u16::from_le_bytes([*c0, *c1]),
                dispenser: u16::from_le_bytes([*d0, *d1]),
            },
            (MSG_LEVELS, [water, beans, milk]) => PanelUpdate::Levels {
                water: *water,
                beans: *beans,
                milk: *milk,
            },
            (MSG_ELAPSED, [lo, hi]) => PanelUpdate::Elapsed {
                seconds: u16::from_le_bytes([*lo, *hi]),
            },
            (MSG_TOTAL_CUPS, [a, b, c, d]) => PanelUpdate::TotalCups(u32::from_le_bytes([*a, *b, *c, *d])),
            (MSG_POWER, [on]) => PanelUpdate::Power { on: *on != 0 },
            (MSG_SELECTION_CLEARED, []) => PanelUpdate::SelectionCleared,
            (MSG_SHORTFALL, [code, required, available]) => PanelUpdate::Shortfall {
                ingredient: Ingredient::from_byte(*code).ok_or(FrameError::UnknownMessage)?,
                required: *required,
                available: *available,
            },
            (MSG_PONG, []) => PanelUpdate::Pong,
            _ => return Err(FrameError::UnknownMessage),
        };
        Ok(update)
    }
}
