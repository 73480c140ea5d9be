//! Restaurant management backend
//!
//! REST service for orders, payments, stock, menus, tables, reservations,
//! staff and reporting over SQLite.
//!
//! ```text
//! resto-server/src/
//! ├── core/          # config, state, server, startup errors
//! ├── auth/          # JWT, Argon2, permissions, middleware
//! ├── api/           # HTTP routers and handlers
//! ├── routes/        # router assembly and middleware stack
//! ├── orders/        # order lifecycle, money, payments
//! ├── stock/         # ingredient ledger
//! ├── services/      # notifications, reservations, bootstrap
//! ├── db/            # pool, migrations, repositories
//! └── utils/         # logging, validation, dates
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod routes;
pub mod services;
pub mod stock;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use routes::{build_app, build_router};
pub use services::NotificationBus;
pub use utils::{AppError, AppResult, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Security event on the `security` target
///
/// ```ignore
/// security_log!("WARN", "login_failed", username = name.as_str(), reason = "user_not_found");
/// ```
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env`, read [`Config`] and start logging from it
///
/// Call once from `main`.
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();
    let config = Config::from_env()?;
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    if config.jwt.ephemeral {
        tracing::warn!("JWT_SECRET missing or too short; using a temporary secret for this process");
    }
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
   ___          _
  | _ \___ ___ | |_ ___
  |   / -_|_-< |  _/ _ \
  |_|_\___/__/  \__\___/
    "#
    );
}
