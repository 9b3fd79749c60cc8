pub mod cache_db;
pub mod database;
pub mod models;

pub use cache_db::CacheDatabase;
pub use models::CachedSession;

use std::fs;

/// Ensure data directory exists
pub fn ensure_data_dir() -> std::io::Result<()> {
    fs::create_dir_all("data")?;
    Ok(())
}
