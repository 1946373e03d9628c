//! Database module with SQLite storage and SQLx.

use std::str::FromStr;

use log::debug;
use log::info;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;

use crate::repository::error::DatabaseError;
use crate::repository::table::IsinSubscriptionTable;
use crate::repository::table::NewsEventTable;
use crate::repository::table::TableBase;

pub mod error;
pub mod table;

/// Owns the connection pool and every table handler.
///
/// Constructed once at startup and shared behind an `Arc`.
pub struct Repository {
    pool: SqlitePool,
    /// Dedup ledger of every news item seen so far
    pub news_event: NewsEventTable,
    pub isin_subscription: IsinSubscriptionTable,
}

impl Repository {
    /// Creates the database file if needed, connects and initializes table handlers.
    pub async fn new(db_url: &str, db_path: &str) -> Result<Self, DatabaseError> {
        let path = std::path::Path::new(db_path);
        if !path.exists() {
            debug!("Database path {db_path} does not exist. Creating...");
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| DatabaseError::SetupError {
                    message: format!("cannot create {}: {e}", parent.display()),
                })?;
            }
            std::fs::write(path, "").map_err(|e| DatabaseError::SetupError {
                message: format!("cannot create {db_path}: {e}"),
            })?;
            info!("Created {db_path}");
        }

        debug!("Connecting to db...");
        let opts = SqliteConnectOptions::from_str(db_url)?;
        let pool = SqlitePool::connect_with(opts).await?;
        info!("Connected to db.");

        Ok(Self {
            news_event: NewsEventTable::new(pool.clone()),
            isin_subscription: IsinSubscriptionTable::new(pool.clone()),
            pool,
        })
    }

    /// Runs database migrations from the migrations directory.
    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Deletes all data from all tables. Use with caution!
    pub async fn delete_all_tables(&self) -> Result<(), DatabaseError> {
        self.news_event.delete_all().await?;
        self.isin_subscription.delete_all().await?;
        Ok(())
    }
}
