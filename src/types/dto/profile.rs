use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Public view of a user's profile
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ProfileView {
    /// Owning user's ID (UUID)
    pub user_id: String,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Role name, if any
    pub role: Option<String>,
}

/// Request model for updating a profile
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    /// New display name
    pub name: String,
}
