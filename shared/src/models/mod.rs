//! Data models
//!
//! Shared between resto-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are UTC millis.

pub mod category;
pub mod dining_table;
pub mod ingredient;
pub mod menu_item;
pub mod order;
pub mod payment;
pub mod promotion;
pub mod report;
pub mod reservation;
pub mod settings;
pub mod stock_movement;
pub mod user;
pub mod zone;

// Re-exports
pub use category::*;
pub use dining_table::*;
pub use ingredient::*;
pub use menu_item::*;
pub use order::*;
pub use payment::*;
pub use promotion::*;
pub use report::*;
pub use reservation::*;
pub use settings::*;
pub use stock_movement::*;
pub use user::*;
pub use zone::*;
