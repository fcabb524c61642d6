use crate::domain::{OrderStatus, StockError};
use crate::errors::repository::RepositoryError;
use bcrypt::BcryptError;
use jsonwebtoken::errors::Error as JwtError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Repository error: {0}")]
    Repo(#[from] RepositoryError),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Validation failed: {0:?}")]
    Validation(Vec<String>),

    #[error("Cannot move from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] BcryptError),

    #[error("JWT error: {0}")]
    Jwt(#[from] JwtError),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid Token")]
    InvalidTokenType,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Custom error: {0}")]
    Custom(String),
}

impl ServiceError {
    pub fn order_transition(from: OrderStatus, to: OrderStatus) -> Self {
        ServiceError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl From<StockError> for ServiceError {
    fn from(error: StockError) -> Self {
        ServiceError::Repo(RepositoryError::Stock(error))
    }
}
