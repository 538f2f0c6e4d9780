//! Service settings

use config::{Config, ConfigError, Environment, File};
use data_validator::ValidationConfig;
use growth_series::GrowthDayPolicy;
use inference_engine::PredictorConfig;
use serde::{Deserialize, Serialize};

/// Config file read when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "config/default";
/// Environment prefix, e.g. `HARVEST__SERVER__ADDR`
pub const ENV_PREFIX: &str = "HARVEST";

/// Top-level settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub model: ModelSettings,
    pub features: FeatureSettings,
    pub validation: ValidationConfig,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Listen address
    pub addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// JSON artifact with schema, scaler and regressor
    pub artifact_path: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            artifact_path: "models/harvest_model.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSettings {
    pub growth_days: GrowthDayPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Layer the optional config file under `HARVEST__*` environment variables
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path.unwrap_or(DEFAULT_CONFIG_PATH)).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Pipeline settings for the predictor
    pub fn predictor_config(&self) -> PredictorConfig {
        PredictorConfig {
            validation: self.validation.clone(),
            growth_days: self.features.growth_days,
        }
    }
}
