use sea_orm::DatabaseConnection;
use tracing::info;

use super::{providers, schema};
use crate::config::DatabaseConfig;

/// Opens the pool for whichever engine the URL names and makes sure the
/// tables exist.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let registry = providers::default_registry()?;
    let provider = registry.provider_for_url(&cfg.url)?;

    info!(
        provider = provider.id().as_str(),
        max_connections = cfg.max_connections,
        "connecting to database"
    );
    let db = provider.connect(cfg).await?;
    provider.post_connect(&db).await?;

    info!("ensuring database schema");
    schema::ensure_schema(&db).await?;
    Ok(db)
}
