use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::eyre::eyre;
use dotenv::dotenv;

use crate::data::{DataSource, TableNames};

pub const DEFAULT_DATA_SOURCE: &str = "./data";
pub const DEFAULT_ADMIN_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_SETTINGS_DB: &str = "crisis-docs.db";
pub const DEFAULT_LOG_FILE: &str = "crisis-docs.log";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Runtime configuration, read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_source: String,
    pub tables: (String, String),
    pub admin_api_url: String,
    pub settings_db: PathBuf,
    pub log_file: PathBuf,
    pub poll_interval: Duration,
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let tables = TableNames::default();
        Self {
            data_source: DEFAULT_DATA_SOURCE.to_string(),
            tables: (tables.incidents, tables.details),
            admin_api_url: DEFAULT_ADMIN_API_URL.to_string(),
            settings_db: PathBuf::from(DEFAULT_SETTINGS_DB),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            debug: false,
        }
    }
}

impl AppConfig {
    /// Loads `.env` if present, then reads each setting with its default.
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let poll_interval = get("POLL_INTERVAL_SECS")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(defaults.poll_interval, Duration::from_secs);

        Self {
            data_source: get("DATA_SOURCE").unwrap_or(defaults.data_source),
            tables: (
                get("INCIDENTS_FILE").unwrap_or(defaults.tables.0),
                get("DETAILS_FILE").unwrap_or(defaults.tables.1),
            ),
            admin_api_url: get("ADMIN_API_URL").unwrap_or(defaults.admin_api_url),
            settings_db: get("SETTINGS_DB").map_or(defaults.settings_db, PathBuf::from),
            log_file: get("LOG_FILE").map_or(defaults.log_file, PathBuf::from),
            poll_interval,
            debug: get("DEBUG").is_some_and(|value| value != "0" && value != "false"),
        }
    }

    pub fn data_source(&self) -> color_eyre::Result<DataSource> {
        Ok(DataSource::parse(&self.data_source)?)
    }

    pub fn table_names(&self) -> TableNames {
        TableNames {
            incidents: self.tables.0.clone(),
            details: self.tables.1.clone(),
        }
    }

    /// SQLite URL for the settings database, relative paths resolved against the cwd.
    pub fn database_url(&self) -> color_eyre::Result<String> {
        let base_dir = env::current_dir()?;
        database_url_for(&base_dir.join(&self.settings_db))
    }
}

/// SQLx wants `sqlite:///abs/path` for absolute and `sqlite://rel/path` for relative paths.
fn database_url_for(path: &Path) -> color_eyre::Result<String> {
    let path_str = path
        .to_str()
        .ok_or_else(|| eyre!("Invalid settings database path"))?;
    let clean_path = path_str.trim_start_matches('/');

    Ok(if path.is_absolute() {
        format!("sqlite:///{clean_path}")
    } else {
        format!("sqlite://{clean_path}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.table_names().details, "casualties-details.csv");
    }

    #[test]
    fn env_values_override_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATA_SOURCE", "https://docs.example/data"),
            ("ADMIN_API_URL", "http://10.0.0.2:5000"),
            ("POLL_INTERVAL_SECS", "5"),
            ("DEBUG", "1"),
            ("LOG_FILE", "  "),
        ]));

        assert!(matches!(config.data_source(), Ok(DataSource::Http(_))));
        assert_eq!(config.admin_api_url, "http://10.0.0.2:5000");
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert!(config.debug);
        assert_eq!(config.log_file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn bad_poll_interval_falls_back() {
        for value in ["0", "soon", "-3"] {
            let config = AppConfig::from_lookup(lookup(&[("POLL_INTERVAL_SECS", value)]));
            assert_eq!(config.poll_interval, Duration::from_secs(2), "value {value}");
        }
    }

    #[test]
    fn database_urls_match_sqlx_forms() {
        assert_eq!(
            database_url_for(Path::new("/var/lib/docs.db")).ok(),
            Some("sqlite:///var/lib/docs.db".to_string())
        );
        assert_eq!(
            database_url_for(Path::new("docs.db")).ok(),
            Some("sqlite://docs.db".to_string())
        );
    }
}
