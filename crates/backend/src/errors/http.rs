use crate::errors::{error::ErrorResponse, repository::RepositoryError, service::ServiceError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidCredentials => {
                HttpError::Unauthorized("Invalid credentials".to_string())
            }

            ServiceError::Validation(errors) => {
                HttpError::BadRequest(format!("Validation failed: {}", errors.join("; ")))
            }

            ServiceError::Forbidden(msg) => HttpError::Forbidden(msg),

            ServiceError::InvalidTransition { from, to } => {
                HttpError::Conflict(format!("Cannot move from '{from}' to '{to}'"))
            }

            ServiceError::Repo(repo_err) => match repo_err {
                RepositoryError::NotFound => HttpError::NotFound("Not found".into()),
                RepositoryError::Conflict(msg) => HttpError::Conflict(msg),
                RepositoryError::AlreadyExists(msg) => {
                    HttpError::Conflict(format!("Already exists: {msg}"))
                }
                RepositoryError::ForeignKey(msg) => {
                    HttpError::BadRequest(format!("Foreign key violation: {msg}"))
                }
                RepositoryError::Stock(stock_err) if stock_err.is_not_found() => {
                    HttpError::NotFound(stock_err.to_string())
                }
                RepositoryError::Stock(stock_err) => HttpError::BadRequest(stock_err.to_string()),
                other => {
                    error!("❌ Repository failure: {other}");
                    HttpError::Internal("Repository error".into())
                }
            },

            ServiceError::Jwt(err) => HttpError::Unauthorized(format!("JWT error: {err}")),

            ServiceError::Internal(msg) | ServiceError::Custom(msg) => HttpError::Internal(msg),

            ServiceError::Bcrypt(_) => HttpError::Internal("Internal authentication error".into()),

            ServiceError::TokenExpired => HttpError::Unauthorized("Token expired".into()),

            ServiceError::InvalidTokenType => HttpError::Unauthorized("Invalid token type".into()),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            HttpError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            HttpError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            HttpError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            HttpError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            HttpError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse::new(msg))).into_response()
    }
}
