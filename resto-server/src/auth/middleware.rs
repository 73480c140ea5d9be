//! Authentication middleware
//!
//! Axum middleware for JWT authentication and permission checks.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use futures::future::BoxFuture;

use crate::AppError;
use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// Routes reachable without a token
const PUBLIC_API_ROUTES: &[&str] = &["/api/auth/login"];

/// Require a valid `Authorization: Bearer <token>`
///
/// On success the [`CurrentUser`] is inserted into the request extensions.
///
/// Skipped for:
/// - `OPTIONS *` (CORS preflight)
/// - paths outside `/api/` (`/health`, unknown routes fall through to 404)
/// - `/api/auth/login`
///
/// | Failure | Code |
/// |---------|------|
/// | no header | 401 NotAuthenticated |
/// | expired token | 401 TokenExpired |
/// | bad token | 401 TokenInvalid |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS
        || !path.starts_with("/api/")
        || PUBLIC_API_ROUTES.contains(&path)
    {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = req.uri().to_string());
            return Err(AppError::unauthorized());
        }
    };

    let user = state
        .get_jwt_service()
        .validate_token(token)
        .and_then(CurrentUser::try_from);

    match user {
        Ok(user) => {
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = e.to_string(),
                uri = req.uri().to_string()
            );
            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// Require a permission, e.g. `"orders:manage"`
///
/// `"all"` and `"<resource>:*"` grants match. Must run after
/// [`require_auth`]; returns 403 when the user lacks the permission.
///
/// ```ignore
/// Router::new()
///     .route("/api/ingredients", post(handler::create))
///     .layer(middleware::from_fn(require_permission("stock:manage")));
/// ```
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(Request, Next) -> BoxFuture<'static, Result<Response, AppError>> + Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req.current_user()?;

            if !user.has_permission(permission) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id,
                    username = user.username.as_str(),
                    role = user.role.as_str(),
                    required_permission = permission
                );
                return Err(AppError::forbidden(format!(
                    "Permission denied: {}",
                    permission
                )));
            }

            Ok(next.run(req).await)
        })
    }
}

/// Require the MANAGER role
pub async fn require_manager(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req.current_user()?;
    if !user.is_manager() {
        security_log!(
            "WARN",
            "manager_required",
            user_id = user.id,
            username = user.username.as_str(),
            role = user.role.as_str()
        );
        return Err(AppError::new(shared::ErrorCode::RoleRequired));
    }

    Ok(next.run(req).await)
}

/// Read the [`CurrentUser`] placed by [`require_auth`]
pub trait CurrentUserExt {
    /// 401 when the request was not authenticated
    fn current_user(&self) -> Result<&CurrentUser, AppError>;
}

impl CurrentUserExt for Request {
    fn current_user(&self) -> Result<&CurrentUser, AppError> {
        self.extensions()
            .get::<CurrentUser>()
            .ok_or_else(AppError::unauthorized)
    }
}
