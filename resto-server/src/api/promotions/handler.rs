//! Promotion API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{Promotion, PromotionCreate, PromotionKind, PromotionUpdate};

use crate::core::ServerState;
use crate::db::repository::promotion;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

const RESOURCE: &str = "promotion";

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::PromotionNotFound, format!("Promotion {id} not found"))
        .with_detail("promotion_id", id)
}

/// PERCENTAGE in (0, 100], FIXED_AMOUNT > 0, window `starts_at < ends_at`
fn check_rules(kind: PromotionKind, value: f64, starts_at: i64, ends_at: i64) -> AppResult<()> {
    let value_ok = value.is_finite()
        && match kind {
            PromotionKind::Percentage => value > 0.0 && value <= 100.0,
            PromotionKind::FixedAmount => value > 0.0,
        };
    if !value_ok {
        let expected = match kind {
            PromotionKind::Percentage => "a percentage in (0, 100]",
            PromotionKind::FixedAmount => "a positive amount",
        };
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("value must be {expected}, got {value}"),
        )
        .with_detail("field", "value"));
    }
    if starts_at >= ends_at {
        return Err(AppError::validation("starts_at must be before ends_at")
            .with_detail("field", "ends_at"));
    }
    Ok(())
}

/// GET /api/promotions
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Promotion>>> {
    Ok(Json(promotion::find_all(&state.pool).await?))
}

/// GET /api/promotions/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Promotion>> {
    let found = promotion::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(found))
}

/// POST /api/promotions
pub async fn create(
    State(state): State<ServerState>,
    Json(mut payload): Json<PromotionCreate>,
) -> AppResult<(StatusCode, Json<Promotion>)> {
    validate_required_text(&payload.code, "code", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    check_rules(payload.kind, payload.value, payload.starts_at, payload.ends_at)?;
    payload.code = payload.code.trim().to_string();

    let created = promotion::create(&state.pool, payload)
        .await
        .map_err(|e| e.on_duplicate(ErrorCode::PromotionCodeExists))?;
    state.broadcast_sync(RESOURCE, "created", created.id, Some(&created));
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/promotions/{id} - rules are checked on the merged result
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<PromotionUpdate>,
) -> AppResult<Json<Promotion>> {
    if let Some(code) = &payload.code {
        validate_required_text(code, "code", MAX_NAME_LEN)?;
        payload.code = Some(code.trim().to_string());
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let existing = promotion::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let merged = promotion::merge(existing, payload);
    check_rules(merged.kind, merged.value, merged.starts_at, merged.ends_at)?;

    let saved = promotion::save(&state.pool, &merged)
        .await
        .map_err(|e| e.on_duplicate(ErrorCode::PromotionCodeExists))?;
    state.broadcast_sync(RESOURCE, "updated", id, Some(&saved));
    Ok(Json(saved))
}

/// DELETE /api/promotions/{id}
///
/// Promotions already used by orders are kept; set `is_active = false` instead.
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    promotion::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let used = promotion::count_orders(&state.pool, id).await?;
    if used > 0 {
        return Err(AppError::with_message(
            ErrorCode::InvalidRequest,
            format!("Promotion {id} is used by {used} order(s); deactivate it instead"),
        ));
    }

    promotion::delete(&state.pool, id).await?;
    state.broadcast_sync::<()>(RESOURCE, "deleted", id, None);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_bounds() {
        assert!(check_rules(PromotionKind::Percentage, 100.0, 0, 1).is_ok());
        assert!(check_rules(PromotionKind::Percentage, 0.0, 0, 1).is_err());
        assert!(check_rules(PromotionKind::Percentage, 100.5, 0, 1).is_err());
    }

    #[test]
    fn test_fixed_amount_and_window() {
        assert!(check_rules(PromotionKind::FixedAmount, 500.0, 0, 1).is_ok());
        let err = check_rules(PromotionKind::FixedAmount, -1.0, 0, 1).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        let err = check_rules(PromotionKind::FixedAmount, 5.0, 10, 10).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
