//! Manager notification delivery.
//!
//! Renders the unacknowledged-escalation warning and sends it as a direct
//! message to every manager on the roster. Delivery failures are logged and
//! counted, never propagated: one unreachable manager must not stop the rest.

pub mod manager;
pub mod template;

pub use manager::{BatchReport, ManagerNotifier};
