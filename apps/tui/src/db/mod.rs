pub mod migrations;
pub mod queries;
pub use migrations::{create_database_pool, setup_database};
pub use queries::{load_theme, save_theme, THEME_KEY};
