use crate::authz::resolver::effective_permissions;
use crate::types::internal::access::UserWithAccess;

/// Role name that bypasses every named-permission check, regardless of
/// the role's stored permission rows.
pub const ADMIN_ROLE: &str = "admin";

/// Outcome of an authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Decide whether a loaded user may perform an action guarded by named
/// permissions
///
/// ALLOW if the user's role is exactly "admin"; otherwise ALLOW if the
/// effective permission set intersects `required` (any one match
/// suffices); DENY otherwise. An empty `required` list allows every
/// authenticated user.
pub fn authorize(access: &UserWithAccess, required: &[&str]) -> Decision {
    if required.is_empty() {
        return Decision::Allow;
    }

    if access.role_name() == Some(ADMIN_ROLE) {
        return Decision::Allow;
    }

    let effective = effective_permissions(access);
    if required.iter().any(|name| effective.contains(*name)) {
        Decision::Allow
    } else {
        Decision::Deny
    }
}
