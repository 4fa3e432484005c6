use axum::http::StatusCode;
use sea_orm::{DbErr, SqlErr};

use crate::db::dao::DaoLayerError;

/// Every failure a user action can end in. Handlers turn these into inline
/// messages (HTML) or JSON envelopes; none of them crash the process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),
    /// A referenced key does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The write would break a uniqueness or reference rule.
    #[error("{0}")]
    Conflict(String),
    /// The database could not run the statement.
    #[error("{0}")]
    DataAccess(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Logs the driver error and hides it behind `message`.
    pub fn data_access_with_source(message: impl Into<String>, source: &DbErr) -> Self {
        let message = message.into();
        tracing::error!(error = %source, "{message}");
        Self::DataAccess(message)
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::DataAccess(message) => message.as_str(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::DataAccess(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_data_access(&self) -> bool {
        matches!(self, Self::DataAccess(_))
    }
}

impl From<DaoLayerError> for AppError {
    fn from(err: DaoLayerError) -> Self {
        match err {
            DaoLayerError::NotFound { .. } => AppError::not_found(err.to_string()),
            DaoLayerError::Db(db_err) => match db_err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    AppError::conflict("A record with the same key already exists")
                }
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                    AppError::conflict("The record references, or is referenced by, other records")
                }
                _ => AppError::data_access_with_source(
                    "Database error. Please check the logs for more details",
                    &db_err,
                ),
            },
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        DaoLayerError::Db(err).into()
    }
}
