use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::types::dto::user::UserView;

/// Request model for user registration
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Display name
    pub name: String,

    /// Email address (must be unique)
    pub email: String,

    /// Plaintext password
    pub password: String,
}

/// Response model for registration
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// New user's ID (UUID)
    pub id: String,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Assigned default role name, if one exists
    pub role: Option<String>,

    /// JWT access token for the new account
    pub token: String,
}

/// Request model for login
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: String,

    /// Plaintext password
    pub password: String,
}

/// Response model containing the authentication token
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// JWT access token for API authentication
    pub token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Number of seconds until the token expires
    pub expires_in: i64,
}

/// Request model for password change
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    /// Current password for verification
    pub old_password: String,

    /// New password to set
    pub new_password: String,
}

/// Response model for the my-permissions endpoint
#[derive(Object, Debug)]
pub struct MyPermissionsResponse {
    /// Current user
    pub user: UserView,

    /// Assigned role name, if any
    pub role: Option<String>,

    /// Effective permission set (role permissions plus direct grants,
    /// deduplicated)
    pub permissions: Vec<String>,
}
