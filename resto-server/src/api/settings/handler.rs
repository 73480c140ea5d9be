//! Settings API Handlers

use axum::{Json, extract::State};
use shared::models::{RestaurantSettings, RestaurantSettingsUpdate};

use crate::core::ServerState;
use crate::db::repository::settings;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

/// GET /api/settings
pub async fn get(State(state): State<ServerState>) -> AppResult<Json<RestaurantSettings>> {
    let current = settings::get(&state.pool)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant settings"))?;
    Ok(Json(current))
}

/// PUT /api/settings
///
/// New tax rates apply to totals recalculated from now on; existing orders
/// keep their stored totals until their next change.
pub async fn update(
    State(state): State<ServerState>,
    Json(mut payload): Json<RestaurantSettingsUpdate>,
) -> AppResult<Json<RestaurantSettings>> {
    if let Some(rate) = payload.tax_rate
        && !(rate.is_finite() && (0.0..1.0).contains(&rate))
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("tax_rate must be in [0, 1), got {rate}"),
        )
        .with_detail("field", "tax_rate"));
    }
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
        payload.name = Some(name.trim().to_string());
    }
    if let Some(currency) = &payload.currency {
        validate_required_text(currency, "currency", MAX_SHORT_TEXT_LEN)?;
        payload.currency = Some(currency.trim().to_uppercase());
    }

    let updated = settings::update(&state.pool, payload).await?;
    tracing::info!(tax_rate = updated.tax_rate, currency = %updated.currency, "Settings updated");
    state.broadcast_sync("settings", "updated", 1, Some(&updated));
    Ok(Json(updated))
}
