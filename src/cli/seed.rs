// Seed command implementation
// Creates the base permission catalog, the three standard roles and
// one demo account per role. Safe to run repeatedly: existing rows
// are left alone.

use std::collections::HashMap;

use crate::stores::{CredentialStore, PermissionStore, RoleStore, UserStore};

/// Password for the seeded demo accounts; change it after first login
const SEED_PASSWORD: &str = "changeme-on-first-login";

const RESOURCES: [&str; 3] = ["user", "role", "permission"];
const ACTIONS: [&str; 4] = ["create", "read", "update", "delete"];
const EXTRA_PERMISSIONS: [&str; 2] = ["assign-permission", "assign-role"];

const MODERATOR_PERMISSIONS: [&str; 4] =
    ["read-user", "update-user", "read-role", "read-permission"];

/// Seed the database
///
/// Creates every `action-resource` permission plus the assignment
/// permissions, the admin/moderator/user roles, and a demo account
/// for each role.
pub async fn seed_database(
    credential_store: &CredentialStore,
    role_store: &RoleStore,
    permission_store: &PermissionStore,
    user_store: &UserStore,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Seeding permissions...");
    let permission_ids = seed_permissions(permission_store).await?;

    println!("Seeding roles...");
    let all_ids: Vec<String> = permission_ids.values().cloned().collect();
    let moderator_ids: Vec<String> = MODERATOR_PERMISSIONS
        .iter()
        .filter_map(|name| permission_ids.get(*name).cloned())
        .collect();

    let admin_role = ensure_role(role_store, "admin", "Full access", &all_ids).await?;
    let moderator_role = ensure_role(
        role_store,
        "moderator",
        "Read access plus user updates",
        &moderator_ids,
    )
    .await?;
    let user_role = ensure_role(role_store, "user", "Default role for new accounts", &[]).await?;

    println!("Seeding demo accounts...");
    ensure_account(
        credential_store,
        user_store,
        "Admin",
        "admin@example.com",
        &admin_role,
    )
    .await?;
    ensure_account(
        credential_store,
        user_store,
        "Moderator",
        "moderator@example.com",
        &moderator_role,
    )
    .await?;
    ensure_account(
        credential_store,
        user_store,
        "User",
        "user@example.com",
        &user_role,
    )
    .await?;

    println!("\nSeed completed. Demo account password: {}", SEED_PASSWORD);
    Ok(())
}

/// Create any missing permissions and return the full name-to-id map
async fn seed_permissions(
    permission_store: &PermissionStore,
) -> Result<HashMap<String, String>, Box<dyn std::error::Error>> {
    let mut names: Vec<String> = Vec::new();
    for resource in RESOURCES {
        for action in ACTIONS {
            names.push(format!("{}-{}", action, resource));
        }
    }
    names.extend(EXTRA_PERMISSIONS.iter().map(|n| n.to_string()));

    let mut ids = HashMap::new();
    for name in names {
        let permission = match permission_store.find_by_name(&name).await? {
            Some(existing) => existing,
            None => {
                permission_store
                    .create(name.clone(), Some(format!("Allows {}", name)))
                    .await?
            }
        };
        ids.insert(name, permission.id);
    }

    Ok(ids)
}

async fn ensure_role(
    role_store: &RoleStore,
    name: &str,
    description: &str,
    permission_ids: &[String],
) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(existing) = role_store.find_by_name(name).await? {
        return Ok(existing.id);
    }

    let (role, _) = role_store
        .create(
            name.to_string(),
            Some(description.to_string()),
            permission_ids,
        )
        .await?;
    println!("  created role '{}'", name);
    Ok(role.id)
}

async fn ensure_account(
    credential_store: &CredentialStore,
    user_store: &UserStore,
    name: &str,
    email: &str,
    role_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if user_store.find_by_email_with_access(email).await?.is_some() {
        return Ok(());
    }

    credential_store
        .register(
            name.to_string(),
            email.to_string(),
            SEED_PASSWORD.to_string(),
            Some(role_id.to_string()),
        )
        .await
        .map_err(|e| format!("Failed to seed account {}: {}", email, e))?;
    println!("  created account '{}'", email);

    Ok(())
}
