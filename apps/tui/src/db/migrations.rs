use color_eyre::Result;
use sqlx::{migrate::MigrateDatabase, query, sqlite::SqlitePoolOptions, Sqlite, SqlitePool};

/// Creates the key/value settings table if it doesn't exist
pub async fn setup_database(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    query(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Opens (creating if needed) the settings database behind `database_url`
pub async fn create_database_pool(database_url: &str) -> Result<SqlitePool> {
    tracing::debug!(%database_url, "initializing settings database");

    let db_path = extract_db_path_from_url(database_url)?;

    // Check if parent directory exists and is writable
    if let Some(parent) = std::path::Path::new(&db_path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        if !parent.exists() {
            tracing::info!(dir = %parent.display(), "creating settings directory");
            std::fs::create_dir_all(parent).map_err(|e| {
                color_eyre::eyre::eyre!("Failed to create settings directory: {e}")
            })?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = parent.metadata().map_err(|e| {
                color_eyre::eyre::eyre!("Failed to access directory metadata: {e}")
            })?;
            if metadata.permissions().mode() & 0o200 == 0 {
                return Err(color_eyre::eyre::eyre!(
                    "Settings directory is not writable"
                ));
            }
        }
    }

    let exists = Sqlite::database_exists(database_url)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Error checking settings database: {e}"))?;
    if !exists {
        tracing::info!(path = %db_path, "creating settings database");
        Sqlite::create_database(database_url)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to create SQLite database: {e}"))?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .after_connect(|conn, _| {
            Box::pin(async move {
                use sqlx::Executor as _;
                conn.execute("PRAGMA journal_mode = WAL;").await?;
                conn.execute("PRAGMA synchronous = NORMAL;").await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to connect to SQLite database: {e}"))?;

    setup_database(&pool)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to set up settings schema: {e}"))?;

    Ok(pool)
}

/// Extracts the filesystem path from a `sqlite://` URL
fn extract_db_path_from_url(url: &str) -> Result<String> {
    let Some(path_part) = url.strip_prefix("sqlite://") else {
        return Err(color_eyre::eyre::eyre!("Not a valid SQLite URL: {url}"));
    };

    if cfg!(windows) {
        // Windows: sqlite:///C:/path or sqlite://C:/path
        if let Some(drive_idx) = path_part.find(':') {
            if drive_idx > 0 {
                return Ok(path_part
                    .strip_prefix('/')
                    .unwrap_or(path_part)
                    .to_string());
            }
        }
    }

    // Unix-like absolute path: sqlite:///path
    if path_part.starts_with('/') {
        return Ok(format!("/{}", path_part.trim_start_matches('/')));
    }

    Ok(path_part.to_string())
}
