use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, File as ConfigFile};

pub const DEFAULT_CONFIG_PATH: &str = "config/medassist.toml";
pub const DEFAULT_MODEL_PATH: &str = "models/diagnosis/active.json";
pub const DEFAULT_USERS_PATH: &str = "data/users.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub config_path: Option<PathBuf>,
    pub rpc_host: String,
    pub rpc_port: u16,
    /// JSON disease table; the built-in table when unset
    pub catalog_path: Option<String>,
    /// When unset the default model path is tried and skipped if absent
    pub model_path: Option<String>,
    pub users_path: String,
    pub log_level: String,
    pub log_format: String,
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            rpc_host: "127.0.0.1".to_string(),
            rpc_port: 8000,
            catalog_path: None,
            model_path: None,
            users_path: DEFAULT_USERS_PATH.to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            allowed_origins: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Layer the optional TOML file under `MEDASSIST_*` environment
    /// variables. An explicit `--config` path must exist.
    pub fn load(config_path_override: Option<&str>) -> Result<Self> {
        let resolved_path = if let Some(path) = config_path_override {
            let path = PathBuf::from(path);
            if !path.exists() {
                anyhow::bail!(
                    "Configuration file {} not found (specified via --config)",
                    path.display()
                );
            }
            Some(path)
        } else {
            let path = PathBuf::from(DEFAULT_CONFIG_PATH);
            path.exists().then_some(path)
        };

        let mut builder = Config::builder();
        if let Some(path) = &resolved_path {
            builder = builder.add_source(ConfigFile::from(path.as_path()));
        }
        builder = builder.add_source(config::Environment::with_prefix("MEDASSIST"));

        let config = builder.build().context("failed to read configuration")?;
        Self::from_config(&config, resolved_path)
    }

    fn from_config(config: &Config, config_path: Option<PathBuf>) -> Result<Self> {
        let defaults = Self::default();

        let rpc_port = match get_string_value(config, &["rpc_port"]) {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("invalid rpc_port '{raw}'"))?,
            None => defaults.rpc_port,
        };

        Ok(Self {
            config_path,
            rpc_host: get_string_value(config, &["rpc_host"]).unwrap_or(defaults.rpc_host),
            rpc_port,
            catalog_path: get_string_value(config, &["catalog_path"]),
            model_path: get_string_value(config, &["model_path"]),
            users_path: get_string_value(config, &["users_path"]).unwrap_or(defaults.users_path),
            log_level: get_string_value(config, &["log_level"]).unwrap_or(defaults.log_level),
            log_format: get_string_value(config, &["log_format"]).unwrap_or(defaults.log_format),
            allowed_origins: get_list_value(config, "allowed_origins"),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.rpc_port == 0 {
            anyhow::bail!("rpc_port must be greater than zero");
        }
        if self.rpc_host.trim().is_empty() {
            anyhow::bail!("rpc_host must not be empty");
        }
        if !matches!(self.log_format.as_str(), "pretty" | "json") {
            anyhow::bail!(
                "invalid log_format '{}'; expected 'pretty' or 'json'",
                self.log_format
            );
        }
        if self.users_path.trim().is_empty() {
            anyhow::bail!("users_path must not be empty");
        }
        Ok(())
    }

    pub fn rpc_addr(&self) -> String {
        format!("{}:{}", self.rpc_host, self.rpc_port)
    }

    /// Model file to load, if any: the configured path, or the default
    /// path when it exists.
    pub fn resolved_model_path(&self) -> Option<PathBuf> {
        match &self.model_path {
            Some(path) => Some(PathBuf::from(path)),
            None => {
                let path = Path::new(DEFAULT_MODEL_PATH);
                path.exists().then(|| path.to_path_buf())
            }
        }
    }
}

fn get_string_value(config: &Config, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        config
            .get_string(key)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Arrays from TOML, or comma separated strings from the environment.
fn get_list_value(config: &Config, key: &str) -> Vec<String> {
    if let Ok(values) = config.get_array(key) {
        return values
            .into_iter()
            .filter_map(|value| value.into_string().ok())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect();
    }

    get_string_value(config, &[key])
        .map(|raw| split_list(&raw))
        .unwrap_or_default()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture_config() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("config")
            .join("medassist.toml")
    }

    #[test]
    fn fixture_config_loads() {
        let path = fixture_config();
        let config = AppConfig::load(Some(path.to_str().unwrap())).unwrap();

        assert_eq!(config.rpc_host, "127.0.0.1");
        assert_eq!(config.rpc_port, 8000);
        assert_eq!(config.catalog_path, None);
        assert_eq!(
            config.model_path.as_deref(),
            Some("models/diagnosis/active.json")
        );
        assert_eq!(config.users_path, "data/users.csv");
        assert_eq!(config.allowed_origins.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = AppConfig::load(Some("/nonexistent/medassist.toml")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "rpc_port = 9100").unwrap();
        writeln!(file, "log_format = \"json\"").unwrap();
        file.flush().unwrap();

        let config = AppConfig::load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(config.rpc_port, 9100);
        assert_eq!(config.log_format, "json");
        assert_eq!(config.rpc_host, "127.0.0.1");
        assert_eq!(config.rpc_addr(), "127.0.0.1:9100");
    }

    #[test]
    fn validate_rejects_bad_values() {
        let config = AppConfig {
            log_format: "xml".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            rpc_port: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn comma_separated_origins() {
        assert_eq!(
            split_list(" http://a , ,http://b"),
            vec!["http://a".to_string(), "http://b".to_string()]
        );
    }
}
