//! # Engine Settings
//!
//! Settings for running the engine: where the cost config lives, the
//! default pricing context and how strictly snapshots are checked.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     COGS_CONFIG_PATH=/srv/cogs/costs.json                              │
//! │     COGS_DEFAULT_COUNTRY=US                                            │
//! │     COGS_DEFAULT_SHIPPING_COMPANY=YunTu                                │
//! │     COGS_STRICT=true                                                   │
//! │     COGS_LOG_LEVEL=debug                                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/cogs/cogs.toml (Linux)                                   │
//! │     ~/Library/Application Support/com.cogs.engine/cogs.toml (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     lenient validation, log level "info", no default context          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cogs.toml
//! cost_config_path = "/srv/cogs/costs.json"
//! default_country = "US"
//! default_shipping_company = "YunTu"
//! strict = true
//! log_level = "info"
//! ```

use std::path::PathBuf;

use cogs_core::PricingContext;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Environment Variables
// =============================================================================

pub const ENV_CONFIG_PATH: &str = "COGS_CONFIG_PATH";
pub const ENV_DEFAULT_COUNTRY: &str = "COGS_DEFAULT_COUNTRY";
pub const ENV_DEFAULT_SHIPPING_COMPANY: &str = "COGS_DEFAULT_SHIPPING_COMPANY";
pub const ENV_STRICT: &str = "COGS_STRICT";
pub const ENV_LOG_LEVEL: &str = "COGS_LOG_LEVEL";

// =============================================================================
// Engine Settings
// =============================================================================

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Cost config snapshot (JSON) to load at startup.
    #[serde(default)]
    pub cost_config_path: Option<PathBuf>,

    /// Country used when a caller gives none.
    #[serde(default)]
    pub default_country: Option<String>,

    /// Shipping company used when a caller gives none.
    #[serde(default)]
    pub default_shipping_company: Option<String>,

    /// Refuse to install snapshots that fail validation.
    /// Default: false (install and log warnings)
    #[serde(default)]
    pub strict: bool,

    /// `tracing` filter directive, e.g. `info` or `cogs_core=debug`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            cost_config_path: None,
            default_country: None,
            default_shipping_company: None,
            strict: false,
            log_level: default_log_level(),
        }
    }
}

impl EngineSettings {
    /// Loads settings from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Settings file (cogs.toml)
    /// 3. Environment variables
    pub fn load(settings_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut settings = Self::default();

        if let Some(path) = settings_path.or_else(Self::default_settings_path) {
            if path.exists() {
                info!(?path, "Loading engine settings from file");
                let contents =
                    std::fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
                settings = toml::from_str(&contents).map_err(|e| StoreError::toml(&path, e))?;
            } else {
                debug!(?path, "Settings file not found, using defaults");
            }
        }

        settings.apply_env_overrides();
        settings.validate()?;

        Ok(settings)
    }

    /// Validates the settings.
    pub fn validate(&self) -> StoreResult<()> {
        if self.log_level.trim().is_empty() {
            return Err(StoreError::InvalidSettings(
                "log_level must not be empty".into(),
            ));
        }

        if matches!(&self.default_country, Some(c) if c.trim().is_empty()) {
            return Err(StoreError::InvalidSettings(
                "default_country must not be blank".into(),
            ));
        }

        if matches!(&self.default_shipping_company, Some(s) if s.trim().is_empty()) {
            return Err(StoreError::InvalidSettings(
                "default_shipping_company must not be blank".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var(ENV_CONFIG_PATH) {
            debug!(path = %path, "Overriding cost config path from environment");
            self.cost_config_path = Some(PathBuf::from(path));
        }

        if let Some(country) = var(ENV_DEFAULT_COUNTRY) {
            self.default_country = Some(country);
        }

        if let Some(company) = var(ENV_DEFAULT_SHIPPING_COMPANY) {
            self.default_shipping_company = Some(company);
        }

        if let Some(strict) = var(ENV_STRICT) {
            match strict.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.strict = true,
                "0" | "false" | "no" | "off" => self.strict = false,
                _ => warn!(value = %strict, "Unknown strict flag in environment"),
            }
        }

        if let Some(level) = var(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
    }

    /// Returns the default settings file path.
    pub fn default_settings_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "cogs", "cogs")
            .map(|dirs| dirs.config_dir().join("cogs.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Builds a pricing context, falling back to the configured defaults.
    ///
    /// Returns `None` when either half is missing from both sources.
    pub fn context(
        &self,
        country: Option<String>,
        shipping_company: Option<String>,
    ) -> Option<PricingContext> {
        let country = country.or_else(|| self.default_country.clone())?;
        let shipping_company =
            shipping_company.or_else(|| self.default_shipping_company.clone())?;
        Some(PricingContext::new(country, shipping_company))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = EngineSettings::default();
        assert!(!settings.strict);
        assert_eq!(settings.log_level, "info");
        assert!(settings.cost_config_path.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = EngineSettings::default();

        settings.log_level = "  ".into();
        assert!(settings.validate().is_err());

        settings.log_level = "debug".into();
        settings.default_country = Some(String::new());
        assert!(settings.validate().is_err());

        settings.default_country = Some("US".into());
        settings.default_shipping_company = Some(" ".into());
        assert!(settings.validate().is_err());

        settings.default_shipping_company = Some("YunTu".into());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cogs.toml");
        std::fs::write(
            &path,
            "cost_config_path = \"costs.json\"\ndefault_country = \"CA\"\nstrict = true\n",
        )
        .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let settings: EngineSettings = toml::from_str(&contents).unwrap();
        assert_eq!(settings.cost_config_path, Some(PathBuf::from("costs.json")));
        assert_eq!(settings.default_country.as_deref(), Some("CA"));
        assert!(settings.default_shipping_company.is_none());
        assert!(settings.strict);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cogs.toml");
        std::fs::write(&path, "strict = maybe").unwrap();

        let err = EngineSettings::load(Some(path)).unwrap_err();
        assert!(matches!(err, StoreError::Toml { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = EngineSettings::default();
        settings.apply_overrides(env(&[
            (ENV_CONFIG_PATH, "/srv/costs.json"),
            (ENV_DEFAULT_COUNTRY, "US"),
            (ENV_DEFAULT_SHIPPING_COMPANY, "YunTu"),
            (ENV_STRICT, "TRUE"),
            (ENV_LOG_LEVEL, "debug"),
        ]));

        assert_eq!(settings.cost_config_path, Some(PathBuf::from("/srv/costs.json")));
        assert_eq!(settings.default_country.as_deref(), Some("US"));
        assert_eq!(settings.default_shipping_company.as_deref(), Some("YunTu"));
        assert!(settings.strict);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_unknown_strict_value_is_ignored() {
        let mut settings = EngineSettings {
            strict: true,
            ..Default::default()
        };
        settings.apply_overrides(env(&[(ENV_STRICT, "sometimes")]));
        assert!(settings.strict);
    }

    #[test]
    fn test_context_falls_back_to_defaults() {
        let settings = EngineSettings {
            default_country: Some("US".into()),
            default_shipping_company: Some("YunTu".into()),
            ..Default::default()
        };

        assert_eq!(
            settings.context(None, None),
            Some(PricingContext::new("US", "YunTu"))
        );
        assert_eq!(
            settings.context(Some("CA".into()), None),
            Some(PricingContext::new("CA", "YunTu"))
        );
    }

    #[test]
    fn test_context_missing_half() {
        let settings = EngineSettings::default();
        assert_eq!(settings.context(Some("CA".into()), None), None);
    }

    #[test]
    fn test_toml_serialization() {
        let settings = EngineSettings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        assert!(toml_str.contains("log_level = \"info\""));
    }
}
