use serde::{Deserialize, Serialize};

/// JWT Claims structure
///
/// Binds only the subject identifier. Permissions are resolved fresh
/// on every request, so a token never carries stale privileges.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user_id)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}
