//! Unified error codes for the restaurant backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Stock errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Menu errors (items, categories, promotions)
//! - 7xxx: Table errors (zones, tables, reservations)
//! - 8xxx: User errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so clients can switch on
/// them instead of parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,

    // ==================== 3xxx: Stock ====================
    /// Ingredient not found
    IngredientNotFound = 3001,
    /// Ingredient name already exists
    IngredientNameExists = 3002,
    /// Not enough stock for an outgoing movement
    InsufficientStock = 3003,
    /// Movement quantity must be positive
    InvalidMovementQuantity = 3004,
    /// Ingredient still referenced by movements
    IngredientHasMovements = 3005,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been paid
    OrderAlreadyPaid = 4002,
    /// Order has been cancelled
    OrderCancelled = 4003,
    /// Requested status change is not allowed
    InvalidStatusTransition = 4004,
    /// Order line not found
    OrderLineNotFound = 4006,
    /// Order lines can no longer be changed
    OrderNotEditable = 4008,
    /// Dine-in order requires a table
    OrderTableRequired = 4009,

    // ==================== 5xxx: Payment ====================
    /// Payment not found
    PaymentNotFound = 5001,
    /// Payment amount must be positive
    PaymentInvalidAmount = 5002,
    /// Order is not ready to be paid
    PaymentOrderNotReady = 5003,

    // ==================== 6xxx: Menu ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Menu item name already exists
    MenuItemNameExists = 6002,
    /// Menu item is not available
    MenuItemUnavailable = 6003,
    /// Menu item is referenced by orders
    MenuItemInUse = 6004,
    /// Menu item has invalid price
    MenuItemInvalidPrice = 6005,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category has menu items
    CategoryHasItems = 6102,
    /// Category name already exists
    CategoryNameExists = 6103,
    /// Promotion not found
    PromotionNotFound = 6201,
    /// Promotion code already exists
    PromotionCodeExists = 6202,
    /// Promotion is inactive or outside its validity window
    PromotionNotActive = 6203,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table is occupied
    TableOccupied = 7002,
    /// Table name already exists
    TableNameExists = 7003,
    /// Zone not found
    ZoneNotFound = 7101,
    /// Zone has tables
    ZoneHasTables = 7102,
    /// Zone name already exists
    ZoneNameExists = 7103,
    /// Table has open orders
    TableHasOrders = 7104,
    /// Reservation not found
    ReservationNotFound = 7201,
    /// Reservation overlaps another one on the same table
    ReservationConflict = 7202,
    /// Party size exceeds table capacity
    ReservationCapacityExceeded = 7203,

    // ==================== 8xxx: User ====================
    /// User not found
    UserNotFound = 8001,
    /// Username already exists
    UsernameExists = 8002,
    /// Cannot delete or disable own account
    UserCannotModifySelf = 8003,
    /// Password too short
    PasswordTooShort = 8004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",

            // Stock
            ErrorCode::IngredientNotFound => "Ingredient not found",
            ErrorCode::IngredientNameExists => "Ingredient name already exists",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::InvalidMovementQuantity => "Movement quantity must be greater than zero",
            ErrorCode::IngredientHasMovements => "Ingredient has recorded stock movements",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::OrderCancelled => "Order has been cancelled",
            ErrorCode::InvalidStatusTransition => "Order status transition is not allowed",
            ErrorCode::OrderLineNotFound => "Order line not found",
            ErrorCode::OrderNotEditable => "Order lines can no longer be modified",
            ErrorCode::OrderTableRequired => "Dine-in orders require a table",

            // Payment
            ErrorCode::PaymentNotFound => "Payment not found",
            ErrorCode::PaymentInvalidAmount => "Payment amount must be greater than zero",
            ErrorCode::PaymentOrderNotReady => "Order is not ready to be paid",

            // Menu
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemNameExists => "Menu item name already exists",
            ErrorCode::MenuItemUnavailable => "Menu item is not available",
            ErrorCode::MenuItemInUse => "Menu item is referenced by orders",
            ErrorCode::MenuItemInvalidPrice => "Menu item has invalid price",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryHasItems => "Category has associated menu items",
            ErrorCode::CategoryNameExists => "Category name already exists",
            ErrorCode::PromotionNotFound => "Promotion not found",
            ErrorCode::PromotionCodeExists => "Promotion code already exists",
            ErrorCode::PromotionNotActive => "Promotion is not active",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableOccupied => "Table is occupied",
            ErrorCode::TableNameExists => "Table name already exists",
            ErrorCode::ZoneNotFound => "Zone not found",
            ErrorCode::ZoneHasTables => "Zone has associated tables",
            ErrorCode::ZoneNameExists => "Zone name already exists",
            ErrorCode::TableHasOrders => "Table has open orders",
            ErrorCode::ReservationNotFound => "Reservation not found",
            ErrorCode::ReservationConflict => "Table is already reserved for that time",
            ErrorCode::ReservationCapacityExceeded => "Party size exceeds table capacity",

            // User
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UsernameExists => "Username already exists",
            ErrorCode::UserCannotModifySelf => "Cannot delete or disable own account",
            ErrorCode::PasswordTooShort => "Password must be at least 6 characters",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),

            // Stock
            3001 => Ok(ErrorCode::IngredientNotFound),
            3002 => Ok(ErrorCode::IngredientNameExists),
            3003 => Ok(ErrorCode::InsufficientStock),
            3004 => Ok(ErrorCode::InvalidMovementQuantity),
            3005 => Ok(ErrorCode::IngredientHasMovements),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyPaid),
            4003 => Ok(ErrorCode::OrderCancelled),
            4004 => Ok(ErrorCode::InvalidStatusTransition),
            4006 => Ok(ErrorCode::OrderLineNotFound),
            4008 => Ok(ErrorCode::OrderNotEditable),
            4009 => Ok(ErrorCode::OrderTableRequired),

            // Payment
            5001 => Ok(ErrorCode::PaymentNotFound),
            5002 => Ok(ErrorCode::PaymentInvalidAmount),
            5003 => Ok(ErrorCode::PaymentOrderNotReady),

            // Menu
            6001 => Ok(ErrorCode::MenuItemNotFound),
            6002 => Ok(ErrorCode::MenuItemNameExists),
            6003 => Ok(ErrorCode::MenuItemUnavailable),
            6004 => Ok(ErrorCode::MenuItemInUse),
            6005 => Ok(ErrorCode::MenuItemInvalidPrice),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6102 => Ok(ErrorCode::CategoryHasItems),
            6103 => Ok(ErrorCode::CategoryNameExists),
            6201 => Ok(ErrorCode::PromotionNotFound),
            6202 => Ok(ErrorCode::PromotionCodeExists),
            6203 => Ok(ErrorCode::PromotionNotActive),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::TableOccupied),
            7003 => Ok(ErrorCode::TableNameExists),
            7101 => Ok(ErrorCode::ZoneNotFound),
            7102 => Ok(ErrorCode::ZoneHasTables),
            7103 => Ok(ErrorCode::ZoneNameExists),
            7104 => Ok(ErrorCode::TableHasOrders),
            7201 => Ok(ErrorCode::ReservationNotFound),
            7202 => Ok(ErrorCode::ReservationConflict),
            7203 => Ok(ErrorCode::ReservationCapacityExceeded),

            // User
            8001 => Ok(ErrorCode::UserNotFound),
            8002 => Ok(ErrorCode::UsernameExists),
            8003 => Ok(ErrorCode::UserCannotModifySelf),
            8004 => Ok(ErrorCode::PasswordTooShort),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
