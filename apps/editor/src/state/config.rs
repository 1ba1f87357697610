//! # Configuration State
//!
//! Editor settings loaded at startup.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     INVOICER_CURRENCY_SYMBOL=€                                         │
//! │     INVOICER_TAX_RATE=8.25                                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/invoicer/editor.toml (Linux)                             │
//! │     ~/Library/Application Support/com.invoicer.editor/editor.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # editor.toml
//! currency_symbol = "$"
//! currency_decimals = 2
//! default_tax_rate = 8.25
//! drag_activation_distance = 5.0
//! id_strategy = "uuid"      # uuid | sequential
//! default_template_id = 1
//! ```
//!
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts_rs::TS;

use invoicer_core::drag::DEFAULT_ACTIVATION_DISTANCE;
use invoicer_core::totals::{format_amount, DEFAULT_DISPLAY_DECIMALS};
use invoicer_core::{IdGenerator, SequentialIds, UuidIds};

use crate::error::ConfigError;

/// Upper bound on display decimals.
const MAX_DECIMALS: u32 = 6;

// =============================================================================
// Id Strategy
// =============================================================================

/// How new item ids are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Random UUID v4.
    #[default]
    Uuid,

    /// `id-1`, `id-2`, ... Deterministic, useful for scripted hosts.
    Sequential,
}

impl std::str::FromStr for IdStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uuid" => Ok(IdStrategy::Uuid),
            "sequential" | "counter" => Ok(IdStrategy::Sequential),
            other => Err(ConfigError::Invalid(format!(
                "Unknown id strategy: '{}'. Valid options: uuid, sequential",
                other
            ))),
        }
    }
}

// =============================================================================
// Config State
// =============================================================================

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct ConfigState {
    /// Currency symbol shown before amounts
    pub currency_symbol: String,

    /// Decimal places used when displaying amounts
    pub currency_decimals: u32,

    /// Tax rate (percent) applied to new invoices
    pub default_tax_rate: f64,

    /// Pointer travel in px before a press becomes a drag
    pub drag_activation_distance: f64,

    /// New item id scheme
    pub id_strategy: IdStrategy,

    /// Template preselected for new invoices; `None` uses the built-in default
    pub default_template_id: Option<i64>,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            currency_symbol: "$".to_string(),
            currency_decimals: DEFAULT_DISPLAY_DECIMALS,
            default_tax_rate: 0.0,
            drag_activation_distance: DEFAULT_ACTIVATION_DISTANCE,
            id_strategy: IdStrategy::Uuid,
            default_template_id: None,
        }
    }
}

impl ConfigState {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`editor.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading editor config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load editor config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parses config text. Missing keys keep their defaults.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.currency_decimals > MAX_DECIMALS {
            return Err(ConfigError::Invalid(format!(
                "currency_decimals must be at most {}, got {}",
                MAX_DECIMALS, self.currency_decimals
            )));
        }

        if !self.default_tax_rate.is_finite() || !(0.0..=100.0).contains(&self.default_tax_rate) {
            return Err(ConfigError::Invalid(format!(
                "default_tax_rate must be between 0 and 100, got {}",
                self.default_tax_rate
            )));
        }

        if !self.drag_activation_distance.is_finite() || self.drag_activation_distance < 0.0 {
            return Err(ConfigError::Invalid(
                "drag_activation_distance must be a non-negative number".into(),
            ));
        }

        Ok(())
    }

    /// Applies `INVOICER_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from any variable source.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(symbol) = var("INVOICER_CURRENCY_SYMBOL") {
            self.currency_symbol = symbol;
        }

        if let Some(decimals) = var("INVOICER_CURRENCY_DECIMALS") {
            match decimals.parse::<u32>() {
                Ok(d) => self.currency_decimals = d,
                Err(_) => warn!(value = %decimals, "Ignoring invalid INVOICER_CURRENCY_DECIMALS"),
            }
        }

        if let Some(rate) = var("INVOICER_TAX_RATE") {
            match rate.parse::<f64>() {
                Ok(r) => {
                    debug!(rate = r, "Overriding default tax rate from environment");
                    self.default_tax_rate = r;
                }
                Err(_) => warn!(value = %rate, "Ignoring invalid INVOICER_TAX_RATE"),
            }
        }

        if let Some(distance) = var("INVOICER_DRAG_DISTANCE") {
            match distance.parse::<f64>() {
                Ok(d) => self.drag_activation_distance = d,
                Err(_) => warn!(value = %distance, "Ignoring invalid INVOICER_DRAG_DISTANCE"),
            }
        }

        if let Some(strategy) = var("INVOICER_ID_STRATEGY") {
            match strategy.parse() {
                Ok(s) => self.id_strategy = s,
                Err(e) => warn!("{}", e),
            }
        }

        if let Some(template) = var("INVOICER_DEFAULT_TEMPLATE_ID") {
            match template.parse::<i64>() {
                Ok(id) => self.default_template_id = Some(id),
                Err(_) => warn!(value = %template, "Ignoring invalid INVOICER_DEFAULT_TEMPLATE_ID"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "invoicer", "editor")
            .map(|dirs| dirs.config_dir().join("editor.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// A fresh id generator for a new session.
    pub fn id_generator(&self) -> Box<dyn IdGenerator + Send> {
        match self.id_strategy {
            IdStrategy::Uuid => Box::new(UuidIds),
            IdStrategy::Sequential => Box::new(SequentialIds::new()),
        }
    }

    /// Formats an amount as a currency string.
    ///
    /// ## Example
    /// ```rust
    /// use invoicer_editor::state::ConfigState;
    ///
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(19.8), "$19.80");
    /// ```
    pub fn format_currency(&self, amount: f64) -> String {
        format_amount(amount, &self.currency_symbol, self.currency_decimals)
    }
}
