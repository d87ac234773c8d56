use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::types::dto::common::Pagination;
use crate::types::dto::permission::PermissionView;
use crate::types::dto::role::RoleView;
use crate::types::internal::access::UserWithAccess;

/// A user as returned by the API
///
/// The password hash is never part of this view.
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    /// User ID (UUID)
    pub id: String,

    /// Display name
    pub name: String,

    /// Email address (unique)
    pub email: String,

    /// Whether the account is active
    pub is_active: bool,

    /// Assigned role with its permissions, if any
    pub role: Option<RoleView>,

    /// Directly granted permissions
    pub permissions: Vec<PermissionView>,
}

impl From<UserWithAccess> for UserView {
    fn from(access: UserWithAccess) -> Self {
        let role = access
            .role
            .map(|r| RoleView::from_model(r, access.role_permissions));
        Self {
            id: access.user.id,
            name: access.user.name,
            email: access.user.email,
            is_active: access.user.is_active,
            role,
            permissions: access
                .direct_permissions
                .into_iter()
                .map(PermissionView::from)
                .collect(),
        }
    }
}

/// Response model for the paginated user list
#[derive(Object, Debug)]
pub struct UserListResponse {
    /// Users on the requested page
    pub users: Vec<UserView>,

    /// Pagination metadata
    pub pagination: Pagination,
}

/// Response model for unpaginated user lists
#[derive(Object, Debug)]
pub struct AllUsersResponse {
    /// All matching users
    pub users: Vec<UserView>,
}

/// Request model for updating a user
///
/// Omitted fields are left unchanged.
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    /// New display name
    pub name: Option<String>,

    /// New email address
    pub email: Option<String>,

    /// New role ID
    pub role_id: Option<String>,

    /// New active flag
    pub is_active: Option<bool>,
}

/// Request model for replacing a user's direct permission set
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct AssignPermissionsRequest {
    /// Permission IDs that become the user's direct grants
    pub permission_ids: Vec<String>,
}
