//! Layered configuration: built-in defaults, then `config.toml`, then `ETL_*`
//! environment variables (`ETL_APOD__API_KEY`, `ETL_BASIC__DATABASE_URL`, ...).

use chrono::NaiveTime;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::EtlError;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const CONFIG_PATH_ENV: &str = "ETL_CONFIG";
pub const ENV_PREFIX: &str = "ETL_";

/// Settings that are opaque strings. figment parses env values as typed data,
/// so `007` would become `7`; these are re-read from the environment verbatim.
const VERBATIM_KEYS: &[&str] = &["basic.database_url", "basic.loglevel", "apod.api_key"];

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    UInt(u64),
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// Accept any scalar for a string setting, e.g. `api_key = 12345` in TOML.
fn string_from_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Str(s) => s,
        Scalar::UInt(n) => n.to_string(),
        Scalar::Int(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    })
}

fn env_var_for(key: &str) -> String {
    format!("{ENV_PREFIX}{}", key.replace('.', "__").to_uppercase())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub apod: ApodConfig,
    pub load: LoadConfig,
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    #[serde(deserialize_with = "string_from_scalar")]
    pub database_url: String,
    #[serde(deserialize_with = "string_from_scalar")]
    pub loglevel: String,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:apod.db".to_string(),
            loglevel: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApodConfig {
    pub url: Url,
    /// Sent as the `api_key` query parameter. Never logged.
    #[serde(deserialize_with = "string_from_scalar")]
    pub api_key: String,
    pub proxy: Option<Url>,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
}

impl Default for ApodConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("https://api.nasa.gov/planetary/apod")
                .expect("default APOD url is valid"),
            api_key: String::new(),
            proxy: None,
            connect_timeout_secs: 5,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStrategy {
    /// Single `INSERT ... ON CONFLICT(date) DO NOTHING`.
    #[default]
    Atomic,
    /// `SELECT COUNT(*)` on the date, then a plain insert.
    CheckThenInsert,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub strategy: LoadStrategy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    #[default]
    Once,
    Daily,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub mode: ScheduleMode,
    /// Time of day (UTC) for daily runs.
    pub run_at: NaiveTime,
    pub run_on_start: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            mode: ScheduleMode::Once,
            run_at: NaiveTime::MIN,
            run_on_start: true,
        }
    }
}

impl Config {
    /// Load from the file named by `ETL_CONFIG` (or `config.toml`) and the environment.
    pub fn load() -> Result<Self, EtlError> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path)
    }

    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from(path: &Path) -> Result<Self, EtlError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        for key in VERBATIM_KEYS {
            if let Ok(raw) = std::env::var(env_var_for(key)) {
                figment = figment.merge(Serialized::default(key, raw));
            }
        }
        Ok(figment.extract()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_apply_without_file_or_env() {
        Jail::expect_with(|_jail| {
            let cfg = Config::load_from(Path::new("absent.toml")).expect("load defaults");
            assert_eq!(cfg.basic.database_url, "sqlite:apod.db");
            assert_eq!(cfg.apod.url.as_str(), "https://api.nasa.gov/planetary/apod");
            assert!(cfg.apod.api_key.is_empty());
            assert_eq!(cfg.load.strategy, LoadStrategy::Atomic);
            assert_eq!(cfg.schedule.mode, ScheduleMode::Once);
            assert_eq!(cfg.schedule.run_at, NaiveTime::MIN);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_toml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "etl.toml",
                r#"
                [basic]
                database_url = "sqlite:from-file.db"

                [apod]
                api_key = "file-key"

                [load]
                strategy = "check_then_insert"

                [schedule]
                mode = "daily"
                run_at = "06:30:00"
                "#,
            )?;
            jail.set_env("ETL_APOD__API_KEY", "env-key");

            let cfg = Config::load_from(Path::new("etl.toml")).expect("load config");
            assert_eq!(cfg.basic.database_url, "sqlite:from-file.db");
            assert_eq!(cfg.apod.api_key, "env-key");
            assert_eq!(cfg.load.strategy, LoadStrategy::CheckThenInsert);
            assert_eq!(cfg.schedule.mode, ScheduleMode::Daily);
            assert_eq!(
                cfg.schedule.run_at,
                NaiveTime::from_hms_opt(6, 30, 0).unwrap()
            );
            Ok(())
        });
    }

    #[test]
    fn numeric_api_key_from_env_is_kept_verbatim() {
        Jail::expect_with(|jail| {
            jail.set_env("ETL_APOD__API_KEY", "12345");
            let cfg = Config::load_from(Path::new("absent.toml")).expect("load config");
            assert_eq!(cfg.apod.api_key, "12345");

            jail.set_env("ETL_APOD__API_KEY", "007");
            jail.set_env("ETL_BASIC__LOGLEVEL", "true");
            let cfg = Config::load_from(Path::new("absent.toml")).expect("load config");
            assert_eq!(cfg.apod.api_key, "007");
            assert_eq!(cfg.basic.loglevel, "true");
            Ok(())
        });
    }

    #[test]
    fn scalar_string_settings_in_toml_are_accepted() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "etl.toml",
                r#"
                [apod]
                api_key = 12345
                "#,
            )?;
            let cfg = Config::load_from(Path::new("etl.toml")).expect("load config");
            assert_eq!(cfg.apod.api_key, "12345");
            Ok(())
        });
    }

    #[test]
    fn invalid_strategy_is_a_config_error() {
        Jail::expect_with(|jail| {
            jail.set_env("ETL_LOAD__STRATEGY", "sometimes");
            let err = Config::load_from(Path::new("absent.toml")).unwrap_err();
            assert!(matches!(err, EtlError::Config(_)));
            Ok(())
        });
    }
}
