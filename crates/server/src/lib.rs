//! Narrator HTTP server
//!
//! REST endpoints for rendering dialogue scripts into published audio.

pub mod http;
pub mod state;

pub use http::create_router;
pub use state::AppState;

use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Initialization error: {0}")]
    Init(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServerError> for axum::http::StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::InvalidRequest(_) => axum::http::StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Init(_) | ServerError::Internal(_) => {
                axum::http::StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ServerError> for narrator_core::Error {
    fn from(err: ServerError) -> Self {
        narrator_core::Error::Server(err.to_string())
    }
}
