use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError};

use crate::ml::smoothing::DEFAULT_SMOOTHING_WINDOW;
use crate::ml::tables::{DEFAULT_BASE_PRICE, MONTHS};
use crate::ml::variety::VarietyForecastSettings;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";
const ENV_PREFIX: &str = "FORECAST";

/// Seasonal row override for one crop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SeasonalProfileConfig {
    #[validate(length(min = 1))]
    pub variety: String,

    /// Twelve monthly multipliers, January first
    #[validate(custom = "validate_seasonal_row")]
    pub factors: Vec<f64>,
}

/// Base price override for one crop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct BasePriceConfig {
    #[validate(length(min = 1))]
    pub variety: String,

    #[validate(custom = "validate_price")]
    pub price: f64,
}

/// Historical demand series override for one crop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct HistoricalDemandConfig {
    #[validate(length(min = 1))]
    pub variety: String,

    #[validate(length(min = 1), custom = "validate_demand_series")]
    pub series: Vec<f64>,
}

/// Market trend override for one variety. Seasonality is taken from the
/// variety's seasonal row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct MarketTrendConfig {
    #[validate(length(min = 1))]
    pub variety: String,

    /// Annualised growth rate
    pub growth_rate: f64,

    #[validate(range(min = 0.0, max = 1.0))]
    pub market_saturation: f64,
}

/// Forecasting engine configuration with validation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ForecastConfig {
    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Moving-average window for the single-crop pipeline
    #[serde(default = "default_smoothing_window")]
    #[validate(custom = "validate_window")]
    pub smoothing_window: usize,

    /// Exponential smoothing factor for variety histories, in (0, 1]
    #[serde(default = "default_smoothing_alpha")]
    #[validate(custom = "validate_smoothing_alpha")]
    pub smoothing_alpha: f64,

    /// Minimum weekly points before a variety is forecast
    #[serde(default = "default_min_history_points")]
    #[validate(custom = "validate_min_history_points")]
    pub min_history_points: usize,

    /// Trailing points used for the variety trend fit
    #[serde(default = "default_trend_window")]
    #[validate(custom = "validate_window")]
    pub trend_window: usize,

    /// Price used for crops without a configured base price
    #[serde(default = "default_base_price")]
    #[validate(custom = "validate_price")]
    pub default_base_price: f64,

    #[serde(default)]
    #[validate]
    pub seasonal_factors: Vec<SeasonalProfileConfig>,

    #[serde(default)]
    #[validate]
    pub base_prices: Vec<BasePriceConfig>,

    #[serde(default)]
    #[validate]
    pub historical_demand: Vec<HistoricalDemandConfig>,

    #[serde(default)]
    #[validate]
    pub market_trends: Vec<MarketTrendConfig>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            smoothing_window: default_smoothing_window(),
            smoothing_alpha: default_smoothing_alpha(),
            min_history_points: default_min_history_points(),
            trend_window: default_trend_window(),
            default_base_price: default_base_price(),
            seasonal_factors: Vec::new(),
            base_prices: Vec::new(),
            historical_demand: Vec::new(),
            market_trends: Vec::new(),
        }
    }
}

impl ForecastConfig {
    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Settings for the multi-variety pipeline.
    pub fn variety_settings(&self) -> VarietyForecastSettings {
        VarietyForecastSettings {
            alpha: self.smoothing_alpha,
            trend_window: self.trend_window,
            min_history_points: self.min_history_points,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Default value functions
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_smoothing_window() -> usize {
    DEFAULT_SMOOTHING_WINDOW
}

fn default_smoothing_alpha() -> f64 {
    0.3
}

fn default_min_history_points() -> usize {
    3
}

fn default_trend_window() -> usize {
    4
}

fn default_base_price() -> f64 {
    DEFAULT_BASE_PRICE
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_smoothing_alpha(alpha: f64) -> Result<(), ValidationError> {
    if alpha.is_finite() && alpha > 0.0 && alpha <= 1.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("smoothing_alpha");
        err.message = Some("Smoothing factor must be in (0, 1]".into());
        Err(err)
    }
}

fn validate_window(window: usize) -> Result<(), ValidationError> {
    if window >= 1 {
        Ok(())
    } else {
        let mut err = ValidationError::new("window");
        err.message = Some("Window must cover at least one point".into());
        Err(err)
    }
}

fn validate_min_history_points(points: usize) -> Result<(), ValidationError> {
    if points >= 3 {
        Ok(())
    } else {
        let mut err = ValidationError::new("min_history_points");
        err.message = Some("At least 3 history points are needed to measure confidence".into());
        Err(err)
    }
}

fn validate_price(price: f64) -> Result<(), ValidationError> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("price");
        err.message = Some("Price must be a non-negative number".into());
        Err(err)
    }
}

fn validate_seasonal_row(factors: &[f64]) -> Result<(), ValidationError> {
    if factors.len() != MONTHS {
        let mut err = ValidationError::new("seasonal_factors");
        err.message = Some("Seasonal row must have exactly 12 monthly factors".into());
        return Err(err);
    }
    if factors.iter().any(|f| !f.is_finite() || *f <= 0.0) {
        let mut err = ValidationError::new("seasonal_factors");
        err.message = Some("Seasonal factors must be positive numbers".into());
        return Err(err);
    }
    Ok(())
}

fn validate_demand_series(series: &[f64]) -> Result<(), ValidationError> {
    if series.iter().all(|v| v.is_finite() && *v >= 0.0) {
        Ok(())
    } else {
        let mut err = ValidationError::new("historical_demand");
        err.message = Some("Historical demand must be non-negative numbers".into());
        Err(err)
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("farm_forecast={}", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

/// Loads engine configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (FORECAST__*)
pub fn load_config() -> Result<ForecastConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    load_config_from(Path::new(CONFIG_DIR), &run_env)
}

/// Same as [`load_config`] with an explicit config directory and profile.
pub fn load_config_from(config_dir: &Path, run_env: &str) -> Result<ForecastConfig, AppConfigError> {
    info!("Loading configuration for environment: {}", run_env);

    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let default_file = config_dir.join("default");
    let env_file = config_dir.join(run_env);

    let config = Config::builder()
        .set_default("environment", run_env)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&default_file.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_file.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let forecast_config: ForecastConfig = config.try_deserialize()?;

    forecast_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(forecast_config)
}
