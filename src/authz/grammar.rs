use std::collections::{HashMap, HashSet};

/// Role every capability lookup falls back to when a user has no
/// assigned role.
pub const BASE_ROLE: &str = "user";

/// CRUD action of a capability grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

/// Whether a grant applies only to resources owned by the subject, or
/// to any instance of the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Own,
    Any,
}

impl Scope {
    /// An `any` grant satisfies an `own` query; the reverse does not
    /// hold.
    fn covers(&self, requested: Scope) -> bool {
        match self {
            Scope::Any => true,
            Scope::Own => requested == Scope::Own,
        }
    }
}

/// A single (action, resource, scope) capability grant
#[derive(Debug, Clone, PartialEq, Eq)]
struct Grant {
    action: Action,
    resource: String,
    scope: Scope,
}

/// Grants belonging to one role, plus the role it extends (if any)
#[derive(Debug, Default)]
struct RoleGrants {
    extends: Option<String>,
    grants: Vec<Grant>,
}

impl RoleGrants {
    fn extends(&mut self, parent: &str) -> &mut Self {
        self.extends = Some(parent.to_string());
        self
    }

    fn grant(&mut self, action: Action, resource: &str, scope: Scope) -> &mut Self {
        self.grants.push(Grant {
            action,
            resource: resource.to_string(),
            scope,
        });
        self
    }
}

/// Static per-role capability table with role extension
///
/// Built once at startup and immutable thereafter. Lookups walk the
/// extension chain from the queried role upward, own grants first,
/// with a cycle guard; no match anywhere in the chain is a denial.
#[derive(Debug, Default)]
pub struct GrantTable {
    roles: HashMap<String, RoleGrants>,
}

impl GrantTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn role(&mut self, name: &str) -> &mut RoleGrants {
        self.roles.entry(name.to_string()).or_default()
    }

    /// The built-in table: `moderator` extends `user`, `admin` extends
    /// `moderator`.
    pub fn builtin() -> Self {
        let mut table = Self::new();

        table
            .role("user")
            .grant(Action::Read, "profile", Scope::Own)
            .grant(Action::Update, "profile", Scope::Own)
            .grant(Action::Read, "post", Scope::Any)
            .grant(Action::Create, "post", Scope::Own)
            .grant(Action::Update, "post", Scope::Own)
            .grant(Action::Delete, "post", Scope::Own);

        table
            .role("moderator")
            .extends("user")
            .grant(Action::Read, "profile", Scope::Any)
            .grant(Action::Update, "post", Scope::Any)
            .grant(Action::Delete, "post", Scope::Any);

        table
            .role("admin")
            .extends("moderator")
            .grant(Action::Create, "profile", Scope::Any)
            .grant(Action::Update, "profile", Scope::Any)
            .grant(Action::Delete, "profile", Scope::Any)
            .grant(Action::Create, "post", Scope::Any)
            .grant(Action::Create, "user", Scope::Any)
            .grant(Action::Read, "user", Scope::Any)
            .grant(Action::Update, "user", Scope::Any)
            .grant(Action::Delete, "user", Scope::Any);

        table
    }

    /// Decide whether `role` holds a grant for `action` on `resource`
    /// at the requested scope
    ///
    /// Checks the role's own grants first, then falls through to every
    /// role it transitively extends, stopping at the first match. An
    /// unknown role, or a cycle in the extension chain, terminates the
    /// walk.
    pub fn is_granted(&self, role: &str, action: Action, resource: &str, scope: Scope) -> bool {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = Some(role);

        while let Some(name) = current {
            if !visited.insert(name) {
                break;
            }
            let Some(role_grants) = self.roles.get(name) else {
                break;
            };
            if role_grants
                .grants
                .iter()
                .any(|g| g.action == action && g.resource == resource && g.scope.covers(scope))
            {
                return true;
            }
            current = role_grants.extends.as_deref();
        }

        false
    }
}

/// Pick the scope for a capability lookup from ownership identifiers
///
/// A caller-supplied owner id equal to the subject id means `own`.
/// Any other owner, and also a missing owner id, resolves to `any` -
/// the `any` lookup is the stricter one since `any` grants are rarer
/// than `own` grants.
pub fn resolve_scope(subject_id: &str, owner_id: Option<&str>) -> Scope {
    match owner_id {
        Some(owner) if owner == subject_id => Scope::Own,
        _ => Scope::Any,
    }
}
