//! Permission Definitions
//!
//! Role-based: each role maps to a fixed permission list carried in the JWT.
//! `resource:*` grants every action on a resource, `all` grants everything.
//!
//! | Role | Scope |
//! |------|-------|
//! | MANAGER | everything |
//! | SERVEUR | orders, payments, reservations, table status, read menus |
//! | CUISINIER | read orders, kitchen status changes, stock, read menus |

use shared::models::Role;

pub const ORDERS_READ: &str = "orders:read";
pub const ORDERS_MANAGE: &str = "orders:manage";
pub const ORDERS_STATUS: &str = "orders:status";
pub const ORDERS_DELETE: &str = "orders:delete";
pub const PAYMENTS_READ: &str = "payments:read";
pub const PAYMENTS_MANAGE: &str = "payments:manage";
pub const PAYMENTS_DELETE: &str = "payments:delete";
pub const STOCK_READ: &str = "stock:read";
pub const STOCK_MANAGE: &str = "stock:manage";
pub const MENU_READ: &str = "menu:read";
pub const MENU_MANAGE: &str = "menu:manage";
pub const TABLES_READ: &str = "tables:read";
pub const TABLES_STATUS: &str = "tables:status";
pub const TABLES_MANAGE: &str = "tables:manage";
pub const RESERVATIONS_READ: &str = "reservations:read";
pub const RESERVATIONS_MANAGE: &str = "reservations:manage";
pub const PROMOTIONS_READ: &str = "promotions:read";
pub const PROMOTIONS_MANAGE: &str = "promotions:manage";
pub const USERS_MANAGE: &str = "users:manage";
pub const REPORTS_VIEW: &str = "reports:view";
pub const SETTINGS_MANAGE: &str = "settings:manage";

/// Every concrete permission
pub const ALL_PERMISSIONS: &[&str] = &[
    ORDERS_READ,
    ORDERS_MANAGE,
    ORDERS_STATUS,
    ORDERS_DELETE,
    PAYMENTS_READ,
    PAYMENTS_MANAGE,
    PAYMENTS_DELETE,
    STOCK_READ,
    STOCK_MANAGE,
    MENU_READ,
    MENU_MANAGE,
    TABLES_READ,
    TABLES_STATUS,
    TABLES_MANAGE,
    RESERVATIONS_READ,
    RESERVATIONS_MANAGE,
    PROMOTIONS_READ,
    PROMOTIONS_MANAGE,
    USERS_MANAGE,
    REPORTS_VIEW,
    SETTINGS_MANAGE,
];

pub const MANAGER_PERMISSIONS: &[&str] = &["all"];

pub const SERVEUR_PERMISSIONS: &[&str] = &[
    ORDERS_READ,
    ORDERS_MANAGE,
    ORDERS_STATUS,
    PAYMENTS_READ,
    PAYMENTS_MANAGE,
    TABLES_READ,
    TABLES_STATUS,
    "reservations:*",
    MENU_READ,
    PROMOTIONS_READ,
];

pub const CUISINIER_PERMISSIONS: &[&str] = &[ORDERS_READ, ORDERS_STATUS, "stock:*", MENU_READ];

/// Permissions granted to a role
pub fn role_permissions(role: Role) -> Vec<String> {
    let list = match role {
        Role::Manager => MANAGER_PERMISSIONS,
        Role::Serveur => SERVEUR_PERMISSIONS,
        Role::Cuisinier => CUISINIER_PERMISSIONS,
    };
    list.iter().map(|s| s.to_string()).collect()
}

/// Validate if a permission string is valid
pub fn is_valid_permission(permission: &str) -> bool {
    permission == "all" || ALL_PERMISSIONS.contains(&permission) || permission.ends_with(":*")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_lists_are_valid() {
        for role in [Role::Manager, Role::Serveur, Role::Cuisinier] {
            for p in role_permissions(role) {
                assert!(is_valid_permission(&p), "{p} is not a known permission");
            }
        }
    }

    #[test]
    fn test_manager_has_all() {
        assert_eq!(role_permissions(Role::Manager), vec!["all".to_string()]);
    }

    #[test]
    fn test_kitchen_cannot_take_payments() {
        let perms = role_permissions(Role::Cuisinier);
        assert!(!perms.iter().any(|p| p.starts_with("payments")));
        assert!(perms.contains(&ORDERS_STATUS.to_string()));
    }
}
