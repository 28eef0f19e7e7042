//! Alerting System
//!
//! Maps engagement and window conditions to user-facing alerts, with
//! severity and cooldown-based deduplication.

mod kind;
mod manager;

pub use kind::{Alert, AlertKind, Severity};
pub use manager::{AlertConfig, AlertManager, AlertState};
