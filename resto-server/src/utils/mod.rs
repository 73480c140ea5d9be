//! Utilities shared by handlers and services
//!
//! - [`logger`]: tracing subscriber setup
//! - [`time`]: report date parsing (UTC)
//! - [`validation`]: text length limits and checks

pub mod logger;
pub mod time;
pub mod validation;

pub use shared::error::{AppError, AppResult, ErrorCode};
