use crate::types::db::{permission, role, user};

/// A fully loaded identity snapshot: the user, its role (if any), the
/// role's permissions and the user's direct permission grants.
///
/// This is the input to the authorization core. It is assembled once
/// per request by the UserStore so every decision is a pure function
/// of already-loaded data.
#[derive(Debug, Clone)]
pub struct UserWithAccess {
    pub user: user::Model,
    pub role: Option<role::Model>,
    pub role_permissions: Vec<permission::Model>,
    pub direct_permissions: Vec<permission::Model>,
}

impl UserWithAccess {
    /// Name of the assigned role, if one is set
    pub fn role_name(&self) -> Option<&str> {
        self.role.as_ref().map(|r| r.name.as_str())
    }
}
