use std::path::{Path, PathBuf};

use ::config as config_rs;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Layered settings loader.
///
/// Precedence, lowest first: struct defaults, an optional `school_desk.toml`
/// next to the working directory (or the file named by `SCHOOL_DESK_CONFIG`),
/// then `APP_*` environment variables nested with `__`
/// (`APP_DATABASE__URL=sqlite::memory:`).
pub trait EnvConfig: Sized + DeserializeOwned {
    const PREFIX: &'static str = "APP";
    const SEPARATOR: &'static str = "__";
    const FILE_STEM: &'static str = "school_desk";
    const FILE_OVERRIDE_VAR: &'static str = "SCHOOL_DESK_CONFIG";

    fn load_dotenv() {
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        let _ = dotenvy::from_filename(manifest_dir.join(".env")).or_else(|_| dotenvy::dotenv());
    }

    fn config_file() -> PathBuf {
        std::env::var_os(Self::FILE_OVERRIDE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(Self::FILE_STEM))
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn from_env() -> Result<Self> {
        Self::load_dotenv();

        let file = Self::config_file();
        let settings = config_rs::Config::builder()
            .add_source(config_rs::File::from(file.as_path()).required(false))
            .add_source(
                config_rs::Environment::with_prefix(Self::PREFIX)
                    .prefix_separator("_")
                    .separator(Self::SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read settings (file: {})", file.display()))?;

        let cfg = settings
            .try_deserialize::<Self>()
            .context("failed to deserialize settings into config")?;

        cfg.validate()?;
        Ok(cfg)
    }
}
