use explorer::BackendError;
use thiserror::Error;

/// Errors raised while setting up the client
#[derive(Error, Debug)]
pub enum ElasticError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("URL cannot be used as a base: {0}")]
    NotABase(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

pub(crate) fn transport(err: reqwest::Error) -> BackendError {
    BackendError::Transport(err.to_string())
}

pub(crate) fn malformed(err: impl std::fmt::Display) -> BackendError {
    BackendError::Malformed(err.to_string())
}
