use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::Result;
use sqlx::SqlitePool;

use crate::admin::{AdminClient, StatusPoller};
use crate::config::AppConfig;
use crate::data::{IncidentLoader, LoadOutcome};
use crate::db::{create_database_pool, load_theme, save_theme};
use crate::domain::Theme;
use crate::error::LoadError;

/// Collaborators the controller talks to: table source, backend and settings store.
#[derive(Debug)]
pub struct AppActions {
    pub loader: Option<IncidentLoader>,
    pub admin: Option<AdminClient>,
    pub db_pool: Option<SqlitePool>,
    pub poll_interval: Duration,
    pub download_dir: PathBuf,
}

impl Default for AppActions {
    fn default() -> Self {
        Self::new()
    }
}

impl AppActions {
    pub fn new() -> Self {
        Self {
            loader: None,
            admin: None,
            db_pool: None,
            poll_interval: Duration::from_secs(crate::config::DEFAULT_POLL_INTERVAL_SECS),
            download_dir: PathBuf::from("./downloads"),
        }
    }

    /// Builds the loader and backend client; the settings store is connected separately.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let loader = IncidentLoader::new(config.data_source()?, config.table_names());
        let admin = AdminClient::new(&config.admin_api_url)?;

        Ok(Self {
            loader: Some(loader),
            admin: Some(admin),
            db_pool: None,
            poll_interval: config.poll_interval,
            download_dir: PathBuf::from("./downloads"),
        })
    }

    pub async fn connect_settings(&mut self, database_url: &str) -> Result<()> {
        self.db_pool = Some(create_database_pool(database_url).await?);
        Ok(())
    }

    pub async fn load_incidents(&self) -> Result<LoadOutcome, LoadError> {
        let loader = self
            .loader
            .as_ref()
            .ok_or_else(|| LoadError::InvalidSource("no data source configured".to_string()))?;
        loader.load().await
    }

    pub async fn load_theme(&self) -> Result<Theme> {
        let pool = self.pool()?;
        load_theme(pool).await.map_err(Into::into)
    }

    pub async fn save_theme(&self, theme: Theme) -> Result<()> {
        let pool = self.pool()?;
        save_theme(pool, theme).await.map_err(Into::into)
    }

    pub fn admin(&self) -> Result<&AdminClient> {
        self.admin
            .as_ref()
            .ok_or_else(|| color_eyre::eyre::eyre!("Extraction backend not configured"))
    }

    pub fn poller(&self) -> Result<StatusPoller> {
        Ok(StatusPoller::new(self.admin()?.clone(), self.poll_interval))
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    fn pool(&self) -> Result<&SqlitePool> {
        self.db_pool
            .as_ref()
            .ok_or_else(|| color_eyre::eyre::eyre!("Settings database not initialized"))
    }
}
