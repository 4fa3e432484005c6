mod postgres;
mod registry;
mod sqlite;

use std::{sync::Arc, time::Duration};

use sea_orm::ConnectOptions;

pub use registry::{DbProvider, DbProviderId, DbProviders};

use self::{postgres::PostgresDbProvider, sqlite::SqliteDbProvider};

pub(crate) const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub fn default_registry() -> anyhow::Result<DbProviders> {
    DbProviders::new()
        .with_provider(Arc::new(PostgresDbProvider))?
        .with_provider(Arc::new(SqliteDbProvider))
}

/// Pool settings shared by every engine.
pub(crate) fn pool_options(cfg: &crate::config::DatabaseConfig) -> ConnectOptions {
    let mut options = ConnectOptions::new(cfg.url.clone());
    options
        .max_connections(cfg.max_connections)
        .min_connections(cfg.min_idle)
        .connect_timeout(CONNECT_TIMEOUT)
        .sqlx_logging(false);
    options
}
