use anyhow::{Result, bail};

use super::AppConfig;
use crate::db::entities::student::Gender;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if cfg.database.url.trim().is_empty() {
        errors.push("database.url must not be empty".to_string());
    }

    if cfg.database.max_connections == 0 {
        errors.push("database.max_connections must be > 0".to_string());
    }

    if cfg.database.min_idle > cfg.database.max_connections {
        errors.push(format!(
            "database.min_idle ({}) must be <= database.max_connections ({})",
            cfg.database.min_idle, cfg.database.max_connections
        ));
    }

    if cfg.reports.default_limit == 0 {
        errors.push("reports.default_limit must be > 0".to_string());
    }

    if cfg.reports.default_limit > cfg.reports.max_limit {
        errors.push(format!(
            "reports.default_limit ({}) must be <= reports.max_limit ({})",
            cfg.reports.default_limit, cfg.reports.max_limit
        ));
    }

    if Gender::try_from(cfg.import.default_gender.as_str()).is_err() {
        errors.push(format!(
            "import.default_gender must be one of M, F (got '{}')",
            cfg.import.default_gender
        ));
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}
