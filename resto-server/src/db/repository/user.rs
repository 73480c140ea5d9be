//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{Role, User};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, username, display_name, hash_pass, role, is_active, created_at";

/// New user row (password already hashed)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub display_name: String,
    pub hash_pass: String,
    pub role: Role,
}

/// Field changes (password already hashed)
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub hash_pass: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let sql = format!("SELECT {COLUMNS} FROM user ORDER BY username");
    let users = sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?;
    Ok(users)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("SELECT {COLUMNS} FROM user WHERE id = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<User>> {
    let sql = format!("SELECT {COLUMNS} FROM user WHERE username = ? LIMIT 1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn create(pool: &SqlitePool, data: NewUser) -> RepoResult<User> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO user (id, username, display_name, hash_pass, role, is_active, created_at) VALUES (?, ?, ?, ?, ?, 1, ?)",
    )
    .bind(id)
    .bind(&data.username)
    .bind(&data.display_name)
    .bind(&data.hash_pass)
    .bind(data.role)
    .bind(now_millis())
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: UserChanges) -> RepoResult<User> {
    let rows = sqlx::query(
        "UPDATE user SET username = COALESCE(?1, username), display_name = COALESCE(?2, display_name), hash_pass = COALESCE(?3, hash_pass), role = COALESCE(?4, role), is_active = COALESCE(?5, is_active) WHERE id = ?6",
    )
    .bind(&data.username)
    .bind(&data.display_name)
    .bind(&data.hash_pass)
    .bind(data.role)
    .bind(data.is_active)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

/// Orders opened by this user
pub async fn count_orders(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE server_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM user WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
