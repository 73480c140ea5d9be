//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::IngredientNotFound
            | Self::OrderNotFound
            | Self::OrderLineNotFound
            | Self::PaymentNotFound
            | Self::MenuItemNotFound
            | Self::CategoryNotFound
            | Self::PromotionNotFound
            | Self::TableNotFound
            | Self::ZoneNotFound
            | Self::ReservationNotFound
            | Self::UserNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::IngredientNameExists
            | Self::IngredientHasMovements
            | Self::OrderAlreadyPaid
            | Self::MenuItemNameExists
            | Self::MenuItemInUse
            | Self::CategoryHasItems
            | Self::CategoryNameExists
            | Self::PromotionCodeExists
            | Self::TableNameExists
            | Self::TableOccupied
            | Self::ZoneHasTables
            | Self::ZoneNameExists
            | Self::TableHasOrders
            | Self::ReservationConflict
            | Self::UsernameExists => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied | Self::RoleRequired | Self::UserCannotModifySelf => {
                StatusCode::FORBIDDEN
            }

            // 503 Service Unavailable
            Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
