// End-to-end flow over the service layer: seed the database, register
// and log in accounts, then exercise both authorization modes against
// a live in-memory database.

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use rbac_backend::authz::{Action, Authorizer, Requirement};
use rbac_backend::cli::seed::seed_database;
use rbac_backend::errors::auth::AuthError;
use rbac_backend::services::{AuthService, TokenService};
use rbac_backend::stores::{
    CredentialStore, PermissionStore, RoleStore, UserStore, UserUpdate,
};

const TEST_SECRET: &str = "integration-test-secret-32-characters!!";
const TEST_PEPPER: &str = "integration-pepper";
const SEED_PASSWORD: &str = "changeme-on-first-login";

struct App {
    credential_store: Arc<CredentialStore>,
    user_store: Arc<UserStore>,
    role_store: Arc<RoleStore>,
    token_service: Arc<TokenService>,
    auth_service: AuthService,
}

async fn setup() -> App {
    let db: DatabaseConnection = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let credential_store = Arc::new(CredentialStore::new(db.clone(), TEST_PEPPER.to_string()));
    let user_store = Arc::new(UserStore::new(db.clone()));
    let role_store = Arc::new(RoleStore::new(db.clone()));
    let permission_store = Arc::new(PermissionStore::new(db.clone()));

    seed_database(&credential_store, &role_store, &permission_store, &user_store)
        .await
        .expect("Seed failed");

    let token_service = Arc::new(TokenService::new(TEST_SECRET.to_string(), 7));
    let auth_service = AuthService::new(
        user_store.clone(),
        token_service.clone(),
        Arc::new(Authorizer::with_builtin_grants()),
    );

    App {
        credential_store,
        user_store,
        role_store,
        token_service,
        auth_service,
    }
}

/// Log in the way the HTTP layer does: verify credentials, then issue
/// a token for the subject.
async fn login(app: &App, email: &str, password: &str) -> String {
    let user = app
        .credential_store
        .verify_credentials(email, password)
        .await
        .expect("Login failed");
    app.token_service
        .issue(&user.id)
        .expect("Token issuance failed")
}

#[tokio::test]
async fn registration_assigns_the_default_role_and_tokens_authenticate() {
    let app = setup().await;

    let default_role = app
        .role_store
        .find_by_name("user")
        .await
        .expect("Role lookup failed")
        .expect("Seeded default role missing");

    let created = app
        .credential_store
        .register(
            "Fresh".to_string(),
            "fresh@example.com".to_string(),
            "a perfectly fine password".to_string(),
            Some(default_role.id.clone()),
        )
        .await
        .expect("Registration failed");

    let token = login(&app, "fresh@example.com", "a perfectly fine password").await;
    let access = app
        .auth_service
        .authenticate(&token)
        .await
        .expect("Fresh account should authenticate");

    assert_eq!(access.user.id, created.id);
    assert_eq!(access.role_name(), Some("user"));
    assert!(access.role_permissions.is_empty());
}

#[tokio::test]
async fn named_permission_checks_split_the_seeded_roles() {
    let app = setup().await;

    let admin_token = login(&app, "admin@example.com", SEED_PASSWORD).await;
    let moderator_token = login(&app, "moderator@example.com", SEED_PASSWORD).await;
    let user_token = login(&app, "user@example.com", SEED_PASSWORD).await;

    let read_users = Requirement::permission("read-user");
    let delete_users = Requirement::permission("delete-user");

    // The moderator role carries read-user but not delete-user
    app.auth_service
        .authenticate_and_require(&moderator_token, &read_users)
        .await
        .expect("Moderator should read users");
    let denied = app
        .auth_service
        .authenticate_and_require(&moderator_token, &delete_users)
        .await;
    assert!(matches!(denied, Err(AuthError::Forbidden(_))));

    // The base role carries neither
    let denied = app
        .auth_service
        .authenticate_and_require(&user_token, &read_users)
        .await;
    assert!(matches!(denied, Err(AuthError::Forbidden(_))));

    // The admin role passes every named check by name alone
    app.auth_service
        .authenticate_and_require(&admin_token, &delete_users)
        .await
        .expect("Admin should pass any named check");
}

#[tokio::test]
async fn capability_checks_guard_profiles_by_ownership() {
    let app = setup().await;

    let moderator_token = login(&app, "moderator@example.com", SEED_PASSWORD).await;
    let user_token = login(&app, "user@example.com", SEED_PASSWORD).await;

    let user = app
        .auth_service
        .authenticate(&user_token)
        .await
        .expect("User should authenticate");
    let moderator = app
        .auth_service
        .authenticate(&moderator_token)
        .await
        .expect("Moderator should authenticate");

    let read_profile = |owner: &str| Requirement::Capability {
        action: Action::Read,
        resource: "profile".to_string(),
        owner_id: Some(owner.to_string()),
    };
    let update_profile = |owner: &str| Requirement::Capability {
        action: Action::Update,
        resource: "profile".to_string(),
        owner_id: Some(owner.to_string()),
    };

    // Own profile is readable and writable
    app.auth_service
        .require(&user, &read_profile(&user.user.id))
        .expect("Own profile should be readable");
    app.auth_service
        .require(&user, &update_profile(&user.user.id))
        .expect("Own profile should be writable");

    // Someone else's profile is not
    let denied = app
        .auth_service
        .require(&user, &read_profile(&moderator.user.id));
    assert!(matches!(denied, Err(AuthError::Forbidden(_))));

    // The moderator role reads any profile but only updates its own
    app.auth_service
        .require(&moderator, &read_profile(&user.user.id))
        .expect("Moderator should read any profile");
    let denied = app
        .auth_service
        .require(&moderator, &update_profile(&user.user.id));
    assert!(matches!(denied, Err(AuthError::Forbidden(_))));
}

#[tokio::test]
async fn roleless_account_falls_back_to_the_base_role() {
    let app = setup().await;

    let created = app
        .credential_store
        .register(
            "Roleless".to_string(),
            "roleless@example.com".to_string(),
            "a perfectly fine password".to_string(),
            None,
        )
        .await
        .expect("Registration failed");

    let token = login(&app, "roleless@example.com", "a perfectly fine password").await;
    let access = app
        .auth_service
        .authenticate(&token)
        .await
        .expect("Roleless account should authenticate");
    assert_eq!(access.role_name(), None);

    // Capability checks evaluate it as the base role: own yes, any no
    let own = Requirement::Capability {
        action: Action::Update,
        resource: "profile".to_string(),
        owner_id: Some(created.id.clone()),
    };
    app.auth_service
        .require(&access, &own)
        .expect("Own profile should be writable");

    let any = Requirement::Capability {
        action: Action::Update,
        resource: "profile".to_string(),
        owner_id: Some("someone-else".to_string()),
    };
    assert!(matches!(
        app.auth_service.require(&access, &any),
        Err(AuthError::Forbidden(_))
    ));

    // Named checks fail outright: no role, no role permissions
    let named = Requirement::permission("read-user");
    assert!(matches!(
        app.auth_service.require(&access, &named),
        Err(AuthError::Forbidden(_))
    ));
}

#[tokio::test]
async fn deactivation_locks_an_account_out_on_the_next_request() {
    let app = setup().await;

    let token = login(&app, "user@example.com", SEED_PASSWORD).await;
    let access = app
        .auth_service
        .authenticate(&token)
        .await
        .expect("Active account should authenticate");

    app.user_store
        .update(
            &access.user.id,
            UserUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .expect("Update failed")
        .expect("User should exist");

    // The still-valid token no longer authenticates
    let result = app.auth_service.authenticate(&token).await;
    assert!(matches!(result, Err(AuthError::AccountDisabled(_))));
}

#[tokio::test]
async fn role_change_takes_effect_on_the_next_request() {
    let app = setup().await;

    let token = login(&app, "user@example.com", SEED_PASSWORD).await;
    let access = app
        .auth_service
        .authenticate(&token)
        .await
        .expect("Account should authenticate");

    let read_users = Requirement::permission("read-user");
    assert!(matches!(
        app.auth_service.require(&access, &read_users),
        Err(AuthError::Forbidden(_))
    ));

    let moderator = app
        .role_store
        .find_by_name("moderator")
        .await
        .expect("Role lookup failed")
        .expect("Seeded moderator role missing");
    app.user_store
        .update(
            &access.user.id,
            UserUpdate {
                role_id: Some(moderator.id),
                ..Default::default()
            },
        )
        .await
        .expect("Update failed")
        .expect("User should exist");

    // Same token, fresh snapshot, new permissions
    app.auth_service
        .authenticate_and_require(&token, &read_users)
        .await
        .expect("Promoted account should read users");
}

#[tokio::test]
async fn unknown_subject_reads_as_an_invalid_token() {
    let app = setup().await;

    let token = login(&app, "user@example.com", SEED_PASSWORD).await;
    let access = app
        .auth_service
        .authenticate(&token)
        .await
        .expect("Account should authenticate");

    assert!(app
        .user_store
        .delete(&access.user.id)
        .await
        .expect("Delete failed"));

    let result = app.auth_service.authenticate(&token).await;
    assert!(matches!(result, Err(AuthError::InvalidToken(_))));
}
