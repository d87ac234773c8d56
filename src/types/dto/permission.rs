use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::types::db::permission;

/// A permission as returned by the API
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct PermissionView {
    /// Permission ID (UUID)
    pub id: String,

    /// Unique permission name (convention: `action-resource`)
    pub name: String,

    /// Human-readable description
    pub description: Option<String>,
}

impl From<permission::Model> for PermissionView {
    fn from(model: permission::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
        }
    }
}

/// Request model for creating a permission
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CreatePermissionRequest {
    /// Unique permission name
    pub name: String,

    /// Human-readable description
    pub description: Option<String>,
}

/// Request model for updating a permission
///
/// Omitted fields are left unchanged.
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UpdatePermissionRequest {
    /// New permission name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,
}

/// Response model for permission list endpoints
#[derive(Object, Debug)]
pub struct PermissionListResponse {
    /// All permissions
    pub permissions: Vec<PermissionView>,
}
