//! # Config Snapshot Store
//!
//! Holds the currently installed cost config and swaps it atomically.
//!
//! ## Replacement Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Snapshot Replacement                                 │
//! │                                                                         │
//! │  load_path / replace                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate(config) ──► invalid + strict ──► Err(InvalidConfig)          │
//! │       │                                   (old snapshot stays)         │
//! │       ▼                                                                 │
//! │  write lock: current = Arc::new(Snapshot)                              │
//! │                                                                         │
//! │  Readers                                                               │
//! │  ───────                                                               │
//! │  snapshot() clones the Arc under a read lock and releases it, so a     │
//! │  resolution already running keeps the snapshot it started with.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use cogs_core::{validate, CostConfig, ValidationReport};
use tracing::{info, warn};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Snapshot
// =============================================================================

/// An installed cost config together with its validation findings.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub config: CostConfig,
    pub report: ValidationReport,
    pub loaded_at: DateTime<Utc>,
    /// File the config was read from, if any.
    pub source: Option<PathBuf>,
}

impl Snapshot {
    fn build(config: CostConfig, source: Option<PathBuf>) -> Self {
        let report = validate(&config);
        Snapshot {
            config,
            report,
            loaded_at: Utc::now(),
            source,
        }
    }
}

/// Reads and parses a cost config file without installing it.
pub fn read_config(path: &Path) -> StoreResult<CostConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    CostConfig::from_json(&contents).map_err(|e| StoreError::json(path, e))
}

// =============================================================================
// Config Store
// =============================================================================

/// Thread-safe handle to the current snapshot.
#[derive(Debug)]
pub struct ConfigStore {
    current: RwLock<Arc<Snapshot>>,
    strict: bool,
}

impl ConfigStore {
    /// Creates a store around an in-memory config.
    pub fn new(config: CostConfig, strict: bool) -> StoreResult<Self> {
        let snapshot = Self::admit(Snapshot::build(config, None), strict)?;
        Ok(ConfigStore {
            current: RwLock::new(Arc::new(snapshot)),
            strict,
        })
    }

    /// Creates a store from a cost config file.
    pub fn from_path(path: impl AsRef<Path>, strict: bool) -> StoreResult<Self> {
        let path = path.as_ref();
        let config = read_config(path)?;
        let snapshot = Self::admit(Snapshot::build(config, Some(path.to_path_buf())), strict)?;
        info!(?path, version = %snapshot.config.version, "Cost config loaded");
        Ok(ConfigStore {
            current: RwLock::new(Arc::new(snapshot)),
            strict,
        })
    }

    /// Returns the currently installed snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the snapshot with an in-memory config.
    pub fn replace(&self, config: CostConfig) -> StoreResult<Arc<Snapshot>> {
        self.install(Snapshot::build(config, None))
    }

    /// Replaces the snapshot with the contents of a file.
    pub fn load_path(&self, path: impl AsRef<Path>) -> StoreResult<Arc<Snapshot>> {
        let path = path.as_ref();
        let config = read_config(path)?;
        self.install(Snapshot::build(config, Some(path.to_path_buf())))
    }

    /// Re-reads the file the current snapshot came from.
    pub fn reload(&self) -> StoreResult<Arc<Snapshot>> {
        let source = self.snapshot().source.clone().ok_or(StoreError::NoSourcePath)?;
        self.load_path(source)
    }

    fn install(&self, snapshot: Snapshot) -> StoreResult<Arc<Snapshot>> {
        let snapshot = Arc::new(Self::admit(snapshot, self.strict)?);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&snapshot);
        info!(
            version = %snapshot.config.version,
            source = ?snapshot.source,
            "Cost config snapshot installed"
        );
        Ok(snapshot)
    }

    /// Applies the strict/lenient policy to a freshly built snapshot.
    fn admit(snapshot: Snapshot, strict: bool) -> StoreResult<Snapshot> {
        for warning in &snapshot.report.warnings {
            warn!(%warning, "Cost config warning");
        }

        if !snapshot.report.valid {
            if strict {
                warn!(
                    errors = snapshot.report.errors.len(),
                    "Refusing invalid cost config"
                );
                return Err(StoreError::InvalidConfig {
                    errors: snapshot.report.errors,
                });
            }
            for error in &snapshot.report.errors {
                warn!(%error, "Installing cost config with validation error");
            }
        }

        Ok(snapshot)
    }
}
