//! Well-known role name constants.
//!
//! These must match the seed data in the `create_roles_table` migration.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SCANNER: &str = "scanner";
pub const ROLE_VIEWER: &str = "viewer";

/// All role names accepted at account provisioning.
pub const ALL_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_SCANNER, ROLE_VIEWER];
