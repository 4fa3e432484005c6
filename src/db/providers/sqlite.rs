use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

use super::pool_options;
use super::registry::{DbProvider, DbProviderId};
use crate::config::DatabaseConfig;

const BUSY_TIMEOUT_MS: u64 = 5_000;

pub struct SqliteDbProvider;

#[async_trait]
impl DbProvider for SqliteDbProvider {
    fn id(&self) -> DbProviderId {
        DbProviderId::Sqlite
    }

    fn schemes(&self) -> &'static [&'static str] {
        &["sqlite:"]
    }

    async fn connect(&self, cfg: &DatabaseConfig) -> Result<DatabaseConnection> {
        Ok(Database::connect(pool_options(cfg)).await?)
    }

    // Foreign keys are off by default in SQLite.
    async fn post_connect(&self, db: &DatabaseConnection) -> Result<()> {
        db.execute_unprepared("PRAGMA foreign_keys = ON").await?;
        db.execute_unprepared(&format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"))
            .await?;
        Ok(())
    }
}
