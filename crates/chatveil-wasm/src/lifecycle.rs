//! Boot bookkeeping shared by the JS entry points.

use std::cell::Cell;

use chatveil_core::{ConfigError, VeilConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BootPhase {
    #[default]
    Idle,
    /// Claimed, mount deferred until `DOMContentLoaded`.
    Waiting,
    Mounted,
}

/// Lets exactly one boot through per page, counting a deferred mount as
/// already booted. A failed mount releases the gate.
#[derive(Debug, Default)]
pub struct BootGate {
    phase: Cell<BootPhase>,
}

impl BootGate {
    pub const fn new() -> Self {
        Self {
            phase: Cell::new(BootPhase::Idle),
        }
    }

    pub fn phase(&self) -> BootPhase {
        self.phase.get()
    }

    /// `true` for the caller that gets to boot.
    pub fn try_claim(&self) -> bool {
        if self.phase.get() != BootPhase::Idle {
            return false;
        }
        self.phase.set(BootPhase::Waiting);
        true
    }

    pub fn mounted(&self) {
        self.phase.set(BootPhase::Mounted);
    }

    pub fn failed(&self) {
        self.phase.set(BootPhase::Idle);
    }
}

/// Parses the loader's config. Invalid input yields the defaults plus the
/// error so the caller can log it once logging is up.
pub fn resolve_config(config_json: Option<&str>) -> (VeilConfig, Option<ConfigError>) {
    match VeilConfig::from_json(config_json) {
        Ok(config) => (config, None),
        Err(e) => (VeilConfig::default(), Some(e)),
    }
}
