//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use crema_protocol::{PanelEvent, PanelUpdate};

/// Channel capacity for events from the panel
pub const PANEL_EVENT_CHANNEL_SIZE: usize = 8;

/// Channel capacity for updates to the panel
///
/// Power-off alone queues a dozen updates.
const PANEL_UPDATE_CHANNEL_SIZE: usize = 32;

/// Button presses and slider moves from the panel
pub static PANEL_EVENTS: Channel<CriticalSectionRawMutex, PanelEvent, PANEL_EVENT_CHANNEL_SIZE> =
    Channel::new();

/// Indicator and readout changes waiting to go out on the link
pub static PANEL_UPDATES: Channel<CriticalSectionRawMutex, PanelUpdate, PANEL_UPDATE_CHANNEL_SIZE> =
    Channel::new();

/// Signal that a heartbeat (PING) was received from the panel
pub static HEARTBEAT_RECEIVED: Signal<CriticalSectionRawMutex, ()> = Signal::new();
