use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::types::db::{permission, role};
use crate::types::dto::permission::PermissionView;

/// A role together with its permission set
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct RoleView {
    /// Role ID (UUID)
    pub id: String,

    /// Unique role name
    pub name: String,

    /// Human-readable description
    pub description: Option<String>,

    /// Permissions owned by the role
    pub permissions: Vec<PermissionView>,
}

impl RoleView {
    pub fn from_model(role: role::Model, permissions: Vec<permission::Model>) -> Self {
        Self {
            id: role.id,
            name: role.name,
            description: role.description,
            permissions: permissions.into_iter().map(PermissionView::from).collect(),
        }
    }
}

/// Request model for creating a role
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CreateRoleRequest {
    /// Unique role name
    pub name: String,

    /// Human-readable description
    pub description: Option<String>,

    /// Permission IDs to assign to the new role
    pub permission_ids: Option<Vec<String>>,
}

/// Request model for updating a role
///
/// Omitted fields are left unchanged. When `permission_ids` is
/// provided it replaces the role's full permission set.
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    /// New role name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// Replacement permission set (IDs)
    pub permission_ids: Option<Vec<String>>,
}

/// Response model for role list endpoints
#[derive(Object, Debug)]
pub struct RoleListResponse {
    /// All roles with their permissions
    pub roles: Vec<RoleView>,
}
