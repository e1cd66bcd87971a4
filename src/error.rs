use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not set!")]
    MissingConfig(&'static str),
    #[error("{name} is invalid: {reason}")]
    InvalidConfig { name: &'static str, reason: String },
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("completion service returned no usable choice")]
    EmptyCompletion,
    #[error("failed to sign access token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("socket error: {0}")]
    Socket(&'static str),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        handle_error(&self);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

pub fn handle_error(e: &impl std::error::Error) {
    error!("ERROR: {e}")
}
