use std::collections::HashSet;

use crate::types::internal::access::UserWithAccess;

/// Compute the effective permission set of a loaded user
///
/// The union of the assigned role's permissions (if a role is set) and
/// the user's direct grants, deduplicated by name. Pure computation
/// over already-loaded data; the loading itself is the UserStore's job.
pub fn effective_permissions(access: &UserWithAccess) -> HashSet<String> {
    let mut permissions: HashSet<String> = access
        .role_permissions
        .iter()
        .map(|p| p.name.clone())
        .collect();
    permissions.extend(access.direct_permissions.iter().map(|p| p.name.clone()));
    permissions
}
