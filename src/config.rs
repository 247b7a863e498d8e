// Runtime configuration: defaults, then forecaster.toml, then FORECAST_* env.

use crate::errors::{ForecastError, ForecastResult};
use crate::model_loader::DEFAULT_MODEL_PATH;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "forecaster.toml";
pub const ENV_PREFIX: &str = "FORECAST_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecasterConfig {
    pub model_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl Default for ForecasterConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            host: "0.0.0.0".to_string(),
            port: 8501,
            log_level: "info".to_string(),
        }
    }
}

impl ForecasterConfig {
    pub fn figment(config_file: &Path) -> Figment {
        Figment::from(Serialized::defaults(ForecasterConfig::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load and validate configuration. A missing config file is fine;
    /// defaults and environment still apply.
    pub fn load(config_file: Option<&Path>) -> ForecastResult<Self> {
        let file = config_file.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let config: ForecasterConfig = Self::figment(file).extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ForecastResult<()> {
        if self.model_path.as_os_str().is_empty() {
            return Err(ForecastError::config("model_path must be set"));
        }
        self.tracing_level()?;
        Ok(())
    }

    pub fn tracing_level(&self) -> ForecastResult<tracing::Level> {
        self.log_level
            .parse::<tracing::Level>()
            .map_err(|_| ForecastError::config(format!("unknown log_level '{}'", self.log_level)))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_apply_without_file_or_env() {
        Jail::expect_with(|_jail| {
            let cfg = ForecasterConfig::load(None).unwrap();
            assert_eq!(cfg, ForecasterConfig::default());
            assert_eq!(cfg.bind_addr(), "0.0.0.0:8501");
            Ok(())
        });
    }

    #[test]
    fn file_overrides_defaults_and_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                model_path = "models/zone3.json"
                port = 9000
                "#,
            )?;
            jail.set_env("FORECAST_PORT", "9100");
            jail.set_env("FORECAST_LOG_LEVEL", "debug");

            let cfg = ForecasterConfig::load(None).unwrap();
            assert_eq!(cfg.model_path, PathBuf::from("models/zone3.json"));
            assert_eq!(cfg.port, 9100);
            assert_eq!(cfg.tracing_level().unwrap(), tracing::Level::DEBUG);
            Ok(())
        });
    }

    #[test]
    fn explicit_config_path_is_used() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", r#"host = "127.0.0.1""#)?;
            let cfg = ForecasterConfig::load(Some(Path::new("custom.toml"))).unwrap();
            assert_eq!(cfg.host, "127.0.0.1");
            Ok(())
        });
    }

    #[test]
    fn rejects_unknown_log_level_and_empty_model_path() {
        Jail::expect_with(|jail| {
            jail.set_env("FORECAST_LOG_LEVEL", "loud");
            let err = ForecasterConfig::load(None).unwrap_err();
            assert!(err.to_string().contains("unknown log_level"));

            Ok(())
        });

        let cfg = ForecasterConfig {
            model_path: PathBuf::new(),
            ..ForecasterConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("model_path must be set"));
    }
}
