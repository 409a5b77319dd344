//! # cogs-store: Snapshot Loading for the COGS Engine
//!
//! This crate reads everything the engine needs from disk and keeps the
//! current cost config snapshot behind a thread-safe handle.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        COGS Engine Data Flow                            │
//! │                                                                         │
//! │  cogs.toml + COGS_* env          costs.json            order.json       │
//! │       │                              │                      │           │
//! │       ▼                              ▼                      ▼           │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   cogs-store (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ EngineSettings│    │  ConfigStore  │    │ load_line_   │  │   │
//! │  │   │ (settings.rs) │    │ (snapshot.rs) │    │ items        │  │   │
//! │  │   │               │    │               │    │ (order.rs)   │  │   │
//! │  │   │ default ctx   │───►│ Arc<Snapshot> │    │              │  │   │
//! │  │   │ strict flag   │    │ atomic swap   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cogs-core resolvers (&snapshot.config)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`settings`] - Engine settings (TOML file + environment)
//! - [`snapshot`] - Current snapshot handle and replacement policy
//! - [`order`] - Order file loading
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cogs_store::{ConfigStore, EngineSettings};
//!
//! let settings = EngineSettings::load(None)?;
//! let store = ConfigStore::from_path("costs.json", settings.strict)?;
//!
//! let snapshot = store.snapshot();
//! let report = &snapshot.report;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod order;
pub mod settings;
pub mod snapshot;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use order::load_line_items;
pub use settings::EngineSettings;
pub use snapshot::{read_config, ConfigStore, Snapshot};
