//! Alert Manager Implementation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::kind::{AlertKind, Severity};

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Cooldown between duplicate warnings of the same kind (milliseconds)
    pub cooldown_ms: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 5000,
        }
    }
}

/// State of an alert
#[derive(Debug, Clone)]
pub struct AlertState {
    /// Last time this alert was fired
    pub last_fired: Instant,
    /// Number of times fired
    pub fire_count: usize,
}

/// Alert manager for deduplication
pub struct AlertManager {
    /// Configuration
    config: AlertConfig,
    /// Alert states by kind
    states: HashMap<AlertKind, AlertState>,
}

impl AlertManager {
    /// Create a new alert manager
    pub fn new(config: AlertConfig) -> Self {
        info!("Creating alert manager with config: {:?}", config);
        Self {
            config,
            states: HashMap::new(),
        }
    }

    /// Check if an alert should be fired. Terminal alerts always fire.
    pub fn should_fire(&self, kind: AlertKind) -> bool {
        if kind.severity() == Severity::Terminal {
            return true;
        }

        if let Some(state) = self.states.get(&kind) {
            let cooldown = Duration::from_millis(self.config.cooldown_ms);
            if state.last_fired.elapsed() < cooldown {
                debug!("Alert {} suppressed: in cooldown period", kind);
                return false;
            }
        }

        true
    }

    /// Record that an alert was fired
    pub fn record_fire(&mut self, kind: AlertKind) {
        let state = self.states.entry(kind).or_insert(AlertState {
            last_fired: Instant::now(),
            fire_count: 0,
        });

        state.last_fired = Instant::now();
        state.fire_count += 1;

        info!("Alert recorded: {} (count: {})", kind, state.fire_count);
    }

    /// `should_fire` then `record_fire` in one step
    pub fn try_fire(&mut self, kind: AlertKind) -> bool {
        if !self.should_fire(kind) {
            return false;
        }
        self.record_fire(kind);
        true
    }

    /// Times an alert kind has fired
    pub fn fire_count(&self, kind: AlertKind) -> usize {
        self.states.get(&kind).map(|s| s.fire_count).unwrap_or(0)
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}
