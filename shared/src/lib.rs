//! Shared types for the restaurant backend
//!
//! Models, error codes, notification messages and small utilities used by
//! the server and by API clients.

pub mod client;
pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
pub use message::Notification;
