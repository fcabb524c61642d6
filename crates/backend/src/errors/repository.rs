use crate::domain::StockError;
use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Sqlx(SqlxError),

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    #[error(transparent)]
    Stock(#[from] StockError),

    #[error("Custom: {0}")]
    Custom(String),
}

impl From<SqlxError> for RepositoryError {
    fn from(error: SqlxError) -> Self {
        match &error {
            SqlxError::RowNotFound => RepositoryError::NotFound,
            SqlxError::Database(db) => {
                let detail = db
                    .constraint()
                    .map(str::to_string)
                    .unwrap_or_else(|| db.message().to_string());

                if db.is_unique_violation() {
                    RepositoryError::AlreadyExists(detail)
                } else if db.is_foreign_key_violation() {
                    RepositoryError::ForeignKey(detail)
                } else if db.is_check_violation() {
                    RepositoryError::Conflict(detail)
                } else {
                    RepositoryError::Sqlx(error)
                }
            }
            _ => RepositoryError::Sqlx(error),
        }
    }
}
