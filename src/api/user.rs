use poem_openapi::param::{Path, Query};
use poem_openapi::{payload::Json, OpenApi, Tags};
use std::sync::Arc;

use crate::api::auth::BearerAuth;
use crate::authz::Requirement;
use crate::errors::admin::AdminError;
use crate::services::AuthService;
use crate::stores::user_store::UserUpdate;
use crate::stores::UserStore;
use crate::types::dto::common::{MessageResponse, Pagination};
use crate::types::dto::user::{
    AllUsersResponse, AssignPermissionsRequest, UpdateUserRequest, UserListResponse, UserView,
};
use crate::types::internal::access::UserWithAccess;

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_LIMIT: u64 = 10;

/// API tags for user management endpoints
#[derive(Tags)]
enum UserTags {
    /// User management endpoints
    Users,
}

/// User management API endpoints
///
/// Every route is guarded by a named permission; holders of the admin
/// role pass all of them.
pub struct UserApi {
    user_store: Arc<UserStore>,
    auth_service: Arc<AuthService>,
}

impl UserApi {
    /// Create a new UserApi
    pub fn new(user_store: Arc<UserStore>, auth_service: Arc<AuthService>) -> Self {
        Self {
            user_store,
            auth_service,
        }
    }

    async fn guard(
        &self,
        auth: &BearerAuth,
        requirement: &Requirement,
    ) -> Result<UserWithAccess, AdminError> {
        self.auth_service
            .authenticate_and_require(&auth.0.token, requirement)
            .await
            .map_err(AdminError::from_auth)
    }
}

#[OpenApi(prefix_path = "/users")]
impl UserApi {
    /// List users with pagination
    #[oai(path = "/", method = "get", tag = "UserTags::Users")]
    async fn list(
        &self,
        auth: BearerAuth,
        page: Query<Option<u64>>,
        limit: Query<Option<u64>>,
    ) -> Result<Json<UserListResponse>, AdminError> {
        self.guard(&auth, &Requirement::permission("read-user"))
            .await?;

        let page = page.0.unwrap_or(DEFAULT_PAGE).max(1);
        let limit = limit.0.unwrap_or(DEFAULT_LIMIT).max(1);

        let (users, total) = self
            .user_store
            .list_paginated(page, limit)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(UserListResponse {
            users: users.into_iter().map(UserView::from).collect(),
            pagination: Pagination {
                page,
                limit,
                total,
                pages: total.div_ceil(limit),
            },
        }))
    }

    /// List all users, optionally filtered by role name
    #[oai(path = "/all", method = "get", tag = "UserTags::Users")]
    async fn list_all(
        &self,
        auth: BearerAuth,
        role: Query<Option<String>>,
    ) -> Result<Json<AllUsersResponse>, AdminError> {
        self.guard(&auth, &Requirement::permission("read-user"))
            .await?;

        let users = match role.0 {
            Some(role_name) => self
                .user_store
                .list_by_role(&role_name)
                .await
                .map_err(AdminError::from_internal_error)?,
            None => self
                .user_store
                .list_all()
                .await
                .map_err(AdminError::from_internal_error)?,
        };

        Ok(Json(AllUsersResponse {
            users: users.into_iter().map(UserView::from).collect(),
        }))
    }

    /// Get a single user with role and permissions
    #[oai(path = "/:id", method = "get", tag = "UserTags::Users")]
    async fn get(&self, auth: BearerAuth, id: Path<String>) -> Result<Json<UserView>, AdminError> {
        self.guard(&auth, &Requirement::permission("read-user"))
            .await?;

        let access = self
            .user_store
            .load_with_access(&id.0)
            .await
            .map_err(AdminError::from_internal_error)?
            .ok_or_else(|| AdminError::not_found("User"))?;

        Ok(Json(UserView::from(access)))
    }

    /// Update a user's profile fields, role or active flag
    #[oai(path = "/:id", method = "put", tag = "UserTags::Users")]
    async fn update(
        &self,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<UpdateUserRequest>,
    ) -> Result<Json<UserView>, AdminError> {
        self.guard(&auth, &Requirement::permission("update-user"))
            .await?;

        let body = body.0;
        let updated = self
            .user_store
            .update(
                &id.0,
                UserUpdate {
                    name: body.name,
                    email: body.email,
                    role_id: body.role_id,
                    is_active: body.is_active,
                },
            )
            .await
            .map_err(AdminError::from_internal_error)?
            .ok_or_else(|| AdminError::not_found("User"))?;

        Ok(Json(UserView::from(updated)))
    }

    /// Delete a user
    #[oai(path = "/:id", method = "delete", tag = "UserTags::Users")]
    async fn delete(
        &self,
        auth: BearerAuth,
        id: Path<String>,
    ) -> Result<Json<MessageResponse>, AdminError> {
        self.guard(&auth, &Requirement::permission("delete-user"))
            .await?;

        let removed = self
            .user_store
            .delete(&id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        if !removed {
            return Err(AdminError::not_found("User"));
        }

        tracing::info!(user_id = %id.0, "User deleted");

        Ok(Json(MessageResponse {
            message: "User deleted successfully".to_string(),
        }))
    }

    /// Replace a user's direct permission set
    #[oai(path = "/:id/permissions", method = "put", tag = "UserTags::Users")]
    async fn assign_permissions(
        &self,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<AssignPermissionsRequest>,
    ) -> Result<Json<UserView>, AdminError> {
        self.guard(&auth, &Requirement::permission("assign-permission"))
            .await?;

        let updated = self
            .user_store
            .set_direct_permissions(&id.0, &body.permission_ids)
            .await
            .map_err(AdminError::from_internal_error)?
            .ok_or_else(|| AdminError::not_found("User"))?;

        Ok(Json(UserView::from(updated)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use poem_openapi::auth::Bearer;
    use sea_orm::ActiveValue::Set;
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection};

    use crate::authz::Authorizer;
    use crate::services::TokenService;
    use crate::types::db::{permission, role, role_permission, user};

    const TEST_SECRET: &str = "test-secret-key-minimum-32-characters-long";

    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
        db
    }

    struct TestHarness {
        api: UserApi,
        token_service: TokenService,
    }

    impl TestHarness {
        fn token_for(&self, user_id: &str) -> BearerAuth {
            BearerAuth(Bearer {
                token: self.token_service.issue(user_id).unwrap(),
            })
        }
    }

    fn make_harness(db: DatabaseConnection) -> TestHarness {
        let token_service = Arc::new(TokenService::new(TEST_SECRET.to_string(), 7));
        let user_store = Arc::new(UserStore::new(db));
        let auth_service = Arc::new(AuthService::new(
            user_store.clone(),
            token_service.clone(),
            Arc::new(Authorizer::with_builtin_grants()),
        ));
        TestHarness {
            api: UserApi::new(user_store, auth_service),
            token_service: TokenService::new(TEST_SECRET.to_string(), 7),
        }
    }

    async fn insert_role(db: &DatabaseConnection, id: &str, name: &str) {
        let now = Utc::now().timestamp();
        role::ActiveModel {
            id: Set(id.to_string()),
            name: Set(name.to_string()),
            description: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .expect("Failed to insert role");
    }

    async fn insert_permission(db: &DatabaseConnection, id: &str, name: &str) {
        let now = Utc::now().timestamp();
        permission::ActiveModel {
            id: Set(id.to_string()),
            name: Set(name.to_string()),
            description: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .expect("Failed to insert permission");
    }

    async fn grant_role_permission(db: &DatabaseConnection, role_id: &str, permission_id: &str) {
        role_permission::ActiveModel {
            role_id: Set(role_id.to_string()),
            permission_id: Set(permission_id.to_string()),
        }
        .insert(db)
        .await
        .expect("Failed to grant permission");
    }

    async fn insert_user(db: &DatabaseConnection, id: &str, role_id: Option<&str>) {
        let now = Utc::now().timestamp();
        user::ActiveModel {
            id: Set(id.to_string()),
            name: Set(format!("User {}", id)),
            email: Set(format!("{}@example.com", id)),
            password_hash: Set("irrelevant".to_string()),
            is_active: Set(true),
            role_id: Set(role_id.map(String::from)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .expect("Failed to insert user");
    }

    /// Seed a moderator role holding read-user and update-user, the
    /// built-in admin role, and one account per role.
    async fn seed_accounts(db: &DatabaseConnection) {
        insert_role(db, "role-admin", "admin").await;
        insert_role(db, "role-moderator", "moderator").await;
        insert_permission(db, "perm-read-user", "read-user").await;
        insert_permission(db, "perm-update-user", "update-user").await;
        grant_role_permission(db, "role-moderator", "perm-read-user").await;
        grant_role_permission(db, "role-moderator", "perm-update-user").await;

        insert_user(db, "admin-1", Some("role-admin")).await;
        insert_user(db, "mod-1", Some("role-moderator")).await;
        insert_user(db, "plain-1", None).await;
    }

    #[tokio::test]
    async fn test_moderator_can_list_users() {
        let db = setup_test_db().await;
        seed_accounts(&db).await;
        let harness = make_harness(db);

        let response = harness
            .api
            .list(harness.token_for("mod-1"), Query(None), Query(None))
            .await
            .unwrap();

        assert_eq!(response.users.len(), 3);
        assert_eq!(response.pagination.total, 3);
        assert_eq!(response.pagination.pages, 1);
    }

    #[tokio::test]
    async fn test_pagination_splits_pages() {
        let db = setup_test_db().await;
        seed_accounts(&db).await;
        let harness = make_harness(db);

        let response = harness
            .api
            .list(harness.token_for("mod-1"), Query(Some(2)), Query(Some(2)))
            .await
            .unwrap();

        assert_eq!(response.users.len(), 1);
        assert_eq!(response.pagination.page, 2);
        assert_eq!(response.pagination.pages, 2);
    }

    #[tokio::test]
    async fn test_plain_user_cannot_list_users() {
        let db = setup_test_db().await;
        seed_accounts(&db).await;
        let harness = make_harness(db);

        let result = harness
            .api
            .list(harness.token_for("plain-1"), Query(None), Query(None))
            .await;

        assert!(matches!(result, Err(AdminError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_moderator_cannot_delete_users() {
        let db = setup_test_db().await;
        seed_accounts(&db).await;
        let harness = make_harness(db);

        let result = harness
            .api
            .delete(harness.token_for("mod-1"), Path("plain-1".to_string()))
            .await;

        assert!(matches!(result, Err(AdminError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_admin_can_delete_users_without_named_permission() {
        let db = setup_test_db().await;
        seed_accounts(&db).await;
        let harness = make_harness(db);

        let response = harness
            .api
            .delete(harness.token_for("admin-1"), Path("plain-1".to_string()))
            .await
            .unwrap();

        assert_eq!(response.message, "User deleted successfully");

        let result = harness
            .api
            .get(harness.token_for("admin-1"), Path("plain-1".to_string()))
            .await;
        assert!(matches!(result, Err(AdminError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_role_filter_returns_matching_users_only() {
        let db = setup_test_db().await;
        seed_accounts(&db).await;
        let harness = make_harness(db);

        let response = harness
            .api
            .list_all(
                harness.token_for("admin-1"),
                Query(Some("moderator".to_string())),
            )
            .await
            .unwrap();

        assert_eq!(response.users.len(), 1);
        assert_eq!(response.users[0].id, "mod-1");
    }

    #[tokio::test]
    async fn test_unknown_role_filter_yields_empty_list() {
        let db = setup_test_db().await;
        seed_accounts(&db).await;
        let harness = make_harness(db);

        let response = harness
            .api
            .list_all(
                harness.token_for("admin-1"),
                Query(Some("ghost".to_string())),
            )
            .await
            .unwrap();

        assert!(response.users.is_empty());
    }

    #[tokio::test]
    async fn test_update_assigns_role() {
        let db = setup_test_db().await;
        seed_accounts(&db).await;
        let harness = make_harness(db);

        let response = harness
            .api
            .update(
                harness.token_for("mod-1"),
                Path("plain-1".to_string()),
                Json(UpdateUserRequest {
                    name: None,
                    email: None,
                    role_id: Some("role-moderator".to_string()),
                    is_active: None,
                }),
            )
            .await
            .unwrap();

        let role = response.0.role.expect("role should be assigned");
        assert_eq!(role.name, "moderator");
        assert_eq!(role.permissions.len(), 2);
    }

    #[tokio::test]
    async fn test_update_unknown_user_is_not_found() {
        let db = setup_test_db().await;
        seed_accounts(&db).await;
        let harness = make_harness(db);

        let result = harness
            .api
            .update(
                harness.token_for("mod-1"),
                Path("ghost".to_string()),
                Json(UpdateUserRequest {
                    name: Some("New Name".to_string()),
                    email: None,
                    role_id: None,
                    is_active: None,
                }),
            )
            .await;

        assert!(matches!(result, Err(AdminError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_assign_permissions_replaces_direct_set() {
        let db = setup_test_db().await;
        seed_accounts(&db).await;
        insert_permission(&db, "perm-extra", "extra-grant").await;
        let harness = make_harness(db);

        // First assignment
        let response = harness
            .api
            .assign_permissions(
                harness.token_for("admin-1"),
                Path("plain-1".to_string()),
                Json(AssignPermissionsRequest {
                    permission_ids: vec!["perm-read-user".to_string(), "perm-extra".to_string()],
                }),
            )
            .await
            .unwrap();
        assert_eq!(response.permissions.len(), 2);

        // Replacement drops what is not listed
        let response = harness
            .api
            .assign_permissions(
                harness.token_for("admin-1"),
                Path("plain-1".to_string()),
                Json(AssignPermissionsRequest {
                    permission_ids: vec!["perm-extra".to_string()],
                }),
            )
            .await
            .unwrap();
        assert_eq!(response.permissions.len(), 1);
        assert_eq!(response.permissions[0].name, "extra-grant");
    }

    #[tokio::test]
    async fn test_direct_permission_grants_access_without_role() {
        let db = setup_test_db().await;
        seed_accounts(&db).await;
        let harness = make_harness(db);

        // plain-1 has no role; a direct read-user grant is enough
        harness
            .api
            .assign_permissions(
                harness.token_for("admin-1"),
                Path("plain-1".to_string()),
                Json(AssignPermissionsRequest {
                    permission_ids: vec!["perm-read-user".to_string()],
                }),
            )
            .await
            .unwrap();

        let response = harness
            .api
            .list(harness.token_for("plain-1"), Query(None), Query(None))
            .await;

        assert!(response.is_ok());
    }
}
