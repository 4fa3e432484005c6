pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: i64 = 3000;
pub const DEFAULT_RUST_LOG: &str = "info,tower_http=info";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://school_desk.db?mode=rwc";
pub const DEFAULT_DB_MAX_CONNECTIONS: i64 = 10;
pub const DEFAULT_DB_MIN_IDLE: i64 = 2;
pub const DEFAULT_REPORT_LIMIT: i64 = 10;
pub const DEFAULT_REPORT_MAX_LIMIT: i64 = 100;
pub const DEFAULT_IMPORT_GENDER: &str = "M";
pub const DEFAULT_IMPORT_DOB: &str = "1900-01-01";
