use sqlx::{query, query_scalar, SqlitePool};

use crate::domain::Theme;

/// Settings key the theme preference is stored under.
pub const THEME_KEY: &str = "gaza-docs-theme";

/// Reads a single setting value, `None` when unset
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>, sqlx::Error> {
    query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
}

/// Inserts or replaces a setting value
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<(), sqlx::Error> {
    query(
        "INSERT INTO settings (key, value, updated) VALUES (?, ?, CURRENT_TIMESTAMP) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated = CURRENT_TIMESTAMP",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn load_theme(pool: &SqlitePool) -> Result<Theme, sqlx::Error> {
    let stored = get_setting(pool, THEME_KEY).await?;
    Ok(stored
        .as_deref()
        .and_then(Theme::parse)
        .unwrap_or_default())
}

pub async fn save_theme(pool: &SqlitePool, theme: Theme) -> Result<(), sqlx::Error> {
    set_setting(pool, THEME_KEY, theme.as_str()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::setup_database;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> Result<SqlitePool, sqlx::Error> {
        // Use an in-memory database for testing
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        setup_database(&pool).await?;
        Ok(pool)
    }

    #[tokio::test]
    async fn test_theme_defaults_to_dark() -> Result<(), Box<dyn std::error::Error>> {
        let pool = setup_test_db().await?;

        assert_eq!(load_theme(&pool).await?, Theme::Dark);

        Ok(())
    }

    #[tokio::test]
    async fn test_theme_round_trips_through_settings() -> Result<(), Box<dyn std::error::Error>> {
        let pool = setup_test_db().await?;

        save_theme(&pool, Theme::Light).await?;
        assert_eq!(load_theme(&pool).await?, Theme::Light);
        assert_eq!(
            get_setting(&pool, THEME_KEY).await?,
            Some("light".to_string())
        );

        // Overwrite rather than duplicate
        save_theme(&pool, Theme::Dark).await?;
        let rows: i64 = query_scalar("SELECT COUNT(*) FROM settings")
            .fetch_one(&pool)
            .await?;
        assert_eq!(rows, 1);
        assert_eq!(load_theme(&pool).await?, Theme::Dark);

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_theme_value_falls_back() -> Result<(), Box<dyn std::error::Error>> {
        let pool = setup_test_db().await?;

        set_setting(&pool, THEME_KEY, "sepia").await?;
        assert_eq!(load_theme(&pool).await?, Theme::Dark);

        Ok(())
    }
}
