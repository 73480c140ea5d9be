//! REST API
//!
//! One module per resource, each with a `router()` (routes + permission
//! layers) and a `handler` module.
//!
//! - [`health`] - liveness probe (public)
//! - [`auth`] - login and current user
//! - [`orders`] / [`payments`] - order lifecycle and settlement
//! - [`ingredients`] / [`stock_movements`] - stock ledger
//! - [`categories`] / [`menu_items`] / [`promotions`] - menu
//! - [`zones`] / [`tables`] / [`reservations`] - floor plan
//! - [`users`] - staff accounts (manager only)
//! - [`reports`] / [`settings`]

pub mod auth;
pub mod health;

pub mod orders;
pub mod payments;

pub mod ingredients;
pub mod stock_movements;

pub mod categories;
pub mod menu_items;
pub mod promotions;

pub mod reservations;
pub mod tables;
pub mod zones;

pub mod reports;
pub mod settings;
pub mod users;

pub use shared::error::AppResult;
