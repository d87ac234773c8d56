// Authorization core - pure decision functions over loaded identity
// data plus one immutable grant table built at startup.
pub mod gate;
pub mod grammar;
pub mod resolver;

pub use gate::{Decision, ADMIN_ROLE};
pub use grammar::{Action, GrantTable, Scope};

use crate::types::internal::access::UserWithAccess;

/// What a route requires before its handler may run
///
/// Two independent authorization modes share one entry point: named
/// permission checks against the user's effective set, and capability
/// checks against the static per-role grant table.
#[derive(Debug, Clone)]
pub enum Requirement {
    /// At least one of the named permissions must be present in the
    /// user's effective permission set (OR semantics).
    AnyOf(Vec<String>),

    /// The user's role must hold a capability grant for the action on
    /// the resource. Scope is picked from the owner id: equal to the
    /// subject means `own`, anything else (including absent) means
    /// `any`.
    Capability {
        action: Action,
        resource: String,
        owner_id: Option<String>,
    },
}

impl Requirement {
    /// Convenience constructor for a single named permission
    pub fn permission(name: &str) -> Self {
        Requirement::AnyOf(vec![name.to_string()])
    }

    /// Convenience constructor for an OR list of named permissions
    pub fn any_of(names: &[&str]) -> Self {
        Requirement::AnyOf(names.iter().map(|n| n.to_string()).collect())
    }
}

/// Decision entry point consumed by the HTTP layer
///
/// Holds the immutable capability grant table; named-permission checks
/// need no state beyond the loaded user.
pub struct Authorizer {
    grants: GrantTable,
}

impl Authorizer {
    /// Create an Authorizer over the given grant table
    pub fn new(grants: GrantTable) -> Self {
        Self { grants }
    }

    /// Create an Authorizer over the built-in user/moderator/admin table
    pub fn with_builtin_grants() -> Self {
        Self::new(GrantTable::builtin())
    }

    /// Evaluate a requirement against a loaded user
    pub fn check(&self, access: &UserWithAccess, requirement: &Requirement) -> Decision {
        match requirement {
            Requirement::AnyOf(names) => {
                let required: Vec<&str> = names.iter().map(String::as_str).collect();
                gate::authorize(access, &required)
            }
            Requirement::Capability {
                action,
                resource,
                owner_id,
            } => {
                // The capability grammar is role-only and ignores
                // direct per-user permissions. A user without a role
                // is evaluated as the base "user" role, as the
                // original middleware did.
                let role = access.role_name().unwrap_or(grammar::BASE_ROLE);
                let scope = grammar::resolve_scope(&access.user.id, owner_id.as_deref());
                if self.grants.is_granted(role, *action, resource, scope) {
                    Decision::Allow
                } else {
                    Decision::Deny
                }
            }
        }
    }
}
