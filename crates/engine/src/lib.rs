pub mod ack;
pub mod clock;
pub mod cooldown;
pub mod processor;
pub mod tracker;

pub use processor::{CycleReport, EscalationMonitor, MonitorSettings};
