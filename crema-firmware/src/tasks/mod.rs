//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod machine;
pub mod panel_rx;
pub mod panel_tx;

pub use machine::machine_task;
pub use panel_rx::panel_rx_task;
pub use panel_tx::panel_tx_task;
