pub mod configs;
pub mod defaults;
pub mod envconfig;
pub mod validate;

pub use configs::{
    AppConfig, DatabaseConfig, GeneralConfig, ImportConfig, LoggingConfig, ReportsConfig,
};
pub use envconfig::EnvConfig;
