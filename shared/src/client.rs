//! Client-related types
//!
//! Request/response DTOs for the authentication endpoints.

use serde::{Deserialize, Serialize};

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserInfo,
}

/// User information
///
/// Edit rights are a capability pair, not a role: either flag grants them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub can_edit: bool,
}

impl UserInfo {
    /// Whether this user may create, update or delete records
    pub fn can_edit_records(&self) -> bool {
        self.is_admin || self.can_edit
    }
}
