use std::sync::Arc;

use dashmap::DashMap;
use shared::message::{Notification, SyncPayload};
use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::{Config, Result};
use crate::db::DbService;
use crate::services::{NotificationBus, bootstrap};

/// Per-resource version counters
///
/// DashMap keeps increments lock-free across handlers. Each resource type
/// has its own counter, so listeners can tell when they missed updates.
#[derive(Debug)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// Increment and return the new version (first call returns 1)
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }
}

impl Default for ResourceVersions {
    fn default() -> Self {
        Self::new()
    }
}

/// Server state - shared handles to every service
///
/// Cloning is cheap (pool and Arcs).
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | config | Config | Immutable configuration |
/// | pool | SqlitePool | Database pool |
/// | jwt_service | Arc<JwtService> | Token issue/validation |
/// | notifier | NotificationBus | In-process notifications |
/// | resource_versions | Arc<ResourceVersions> | Sync version counters |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub notifier: NotificationBus,
    pub resource_versions: Arc<ResourceVersions>,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config,
            pool,
            jwt_service,
            notifier: NotificationBus::new(),
            resource_versions: Arc::new(ResourceVersions::new()),
        }
    }

    /// Open the database, apply migrations and seed singleton rows
    ///
    /// Seeds the settings row (tax rate from config) and, when
    /// `ADMIN_PASSWORD` is set and no user exists, a bootstrap manager.
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db = DbService::new(&config.database_url).await?;
        let state = Self::new(config.clone(), db.pool);
        bootstrap::ensure_settings(&state.pool, config.default_tax_rate).await?;
        bootstrap::ensure_admin(&state.pool, config).await?;
        Ok(state)
    }

    /// Start background subscribers
    pub fn start_background_tasks(&self) {
        self.notifier.spawn_log_subscriber();
        tracing::debug!("Notification log subscriber started");
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// Broadcast a resource change
    ///
    /// - `resource`: resource type ("zone", "menu_item", "order"...)
    /// - `action`: "created", "updated" or "deleted"
    /// - `data`: entity snapshot, `None` on delete
    pub fn broadcast_sync<T: serde::Serialize>(
        &self,
        resource: &str,
        action: &str,
        id: impl ToString,
        data: Option<&T>,
    ) {
        let version = self.resource_versions.increment(resource);
        let payload = SyncPayload {
            resource: resource.to_string(),
            version,
            action: action.to_string(),
            id: id.to_string(),
            data: data.and_then(|d| serde_json::to_value(d).ok()),
        };
        self.notifier.publish(Notification::ResourceChanged(payload));
    }
}
