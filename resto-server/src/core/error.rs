use thiserror::Error;

/// Startup and serve errors (everything outside request handling)
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    App(#[from] shared::AppError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Result type for server lifecycle operations
pub type Result<T> = std::result::Result<T, ServerError>;
