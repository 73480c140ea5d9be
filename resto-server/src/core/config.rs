use crate::auth::{JwtConfig, JwtError};

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | HTTP_PORT | 3000 | HTTP port |
/// | DATABASE_URL | sqlite:resto.db | SQLite database |
/// | ENVIRONMENT | development | Runtime environment |
/// | DEFAULT_TAX_RATE | 0.1925 | Tax rate seeded into the settings row |
/// | REQUEST_TIMEOUT_MS | 30000 | Request timeout (ms) |
/// | LOG_LEVEL | info | Log level |
/// | LOG_DIR | (unset) | Daily rolling log directory |
/// | ADMIN_USERNAME | admin | Bootstrap manager account |
/// | ADMIN_PASSWORD | (unset) | Bootstrap manager password |
///
/// JWT settings are read by [`JwtConfig`] (`JWT_SECRET`, `JWT_EXPIRATION_MINUTES`,
/// `JWT_ISSUER`, `JWT_AUDIENCE`).
///
/// # Example
///
/// ```ignore
/// DATABASE_URL=sqlite:/data/resto.db HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API port
    pub http_port: u16,
    /// SQLite connection string
    pub database_url: String,
    /// JWT settings
    pub jwt: JwtConfig,
    /// development | staging | production
    pub environment: String,
    /// Tax rate used when the settings row is first created
    pub default_tax_rate: f64,
    /// Request timeout (ms)
    pub request_timeout_ms: u64,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub admin_username: String,
    /// No bootstrap account is created when unset
    pub admin_password: Option<String>,
}

impl Config {
    /// Load configuration from the environment
    ///
    /// Unset variables fall back to their defaults. Fails in production when
    /// `JWT_SECRET` is missing or shorter than 32 characters.
    pub fn from_env() -> Result<Self, JwtError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        Ok(Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:resto.db".into()),
            jwt: JwtConfig::from_env(environment == "production")?,
            environment,
            default_tax_rate: std::env::var("DEFAULT_TAX_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|rate: &f64| (0.0..1.0).contains(rate))
                .unwrap_or(0.1925),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            admin_username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            admin_password: std::env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty()),
        })
    }

    /// Configuration for tests: in-memory database, fixed JWT secret
    pub fn for_tests() -> Self {
        Self {
            http_port: 0,
            database_url: "sqlite::memory:".into(),
            jwt: JwtConfig {
                secret: "test-secret-key-that-is-long-enough-for-hs256".into(),
                expiration_minutes: 60,
                issuer: "resto-server".into(),
                audience: "resto-clients".into(),
                ephemeral: false,
            },
            environment: "test".into(),
            default_tax_rate: 0.1925,
            request_timeout_ms: 30000,
            log_level: "warn".into(),
            log_dir: None,
            admin_username: "admin".into(),
            admin_password: None,
        }
    }
}
