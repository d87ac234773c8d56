use poem_openapi::param::Path;
use poem_openapi::{payload::Json, OpenApi, Tags};
use std::sync::Arc;

use crate::api::auth::BearerAuth;
use crate::authz::Requirement;
use crate::errors::admin::AdminError;
use crate::services::AuthService;
use crate::stores::permission_store::PermissionUpdate;
use crate::stores::PermissionStore;
use crate::types::dto::common::MessageResponse;
use crate::types::dto::permission::{
    CreatePermissionRequest, PermissionListResponse, PermissionView, UpdatePermissionRequest,
};
use crate::types::internal::access::UserWithAccess;

/// API tags for permission management endpoints
#[derive(Tags)]
enum PermissionTags {
    /// Permission management endpoints
    Permissions,
}

/// Permission management API endpoints
pub struct PermissionApi {
    permission_store: Arc<PermissionStore>,
    auth_service: Arc<AuthService>,
}

impl PermissionApi {
    /// Create a new PermissionApi
    pub fn new(permission_store: Arc<PermissionStore>, auth_service: Arc<AuthService>) -> Self {
        Self {
            permission_store,
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

#[OpenApi(prefix_path = "/permissions")]
impl PermissionApi {
    /// List all permissions
    #[oai(path = "/", method = "get", tag = "PermissionTags::Permissions")]
    async fn list(&self, auth: BearerAuth) -> Result<Json<PermissionListResponse>, AdminError> {
        self.guard(&auth, &Requirement::permission("read-permission"))
            .await?;

        let permissions = self
            .permission_store
            .list()
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(PermissionListResponse {
            permissions: permissions.into_iter().map(PermissionView::from).collect(),
        }))
    }

    /// Get a single permission
    #[oai(path = "/:id", method = "get", tag = "PermissionTags::Permissions")]
    async fn get(
        &self,
        auth: BearerAuth,
        id: Path<String>,
    ) -> Result<Json<PermissionView>, AdminError> {
        self.guard(&auth, &Requirement::permission("read-permission"))
            .await?;

        let permission = self
            .permission_store
            .find(&id.0)
            .await
            .map_err(AdminError::from_internal_error)?
            .ok_or_else(|| AdminError::not_found("Permission"))?;

        Ok(Json(PermissionView::from(permission)))
    }

    /// Create a permission
    #[oai(path = "/", method = "post", tag = "PermissionTags::Permissions")]
    async fn create(
        &self,
        auth: BearerAuth,
        body: Json<CreatePermissionRequest>,
    ) -> Result<Json<PermissionView>, AdminError> {
        self.guard(&auth, &Requirement::permission("create-permission"))
            .await?;

        let body = body.0;
        let existing = self
            .permission_store
            .find_by_name(&body.name)
            .await
            .map_err(AdminError::from_internal_error)?;
        if existing.is_some() {
            return Err(AdminError::duplicate_name("Permission"));
        }

        let created = self
            .permission_store
            .create(body.name, body.description)
            .await
            .map_err(AdminError::from_internal_error)?;

        tracing::info!(permission_id = %created.id, "Permission created");

        Ok(Json(PermissionView::from(created)))
    }

    /// Update a permission
    #[oai(path = "/:id", method = "put", tag = "PermissionTags::Permissions")]
    async fn update(
        &self,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<UpdatePermissionRequest>,
    ) -> Result<Json<PermissionView>, AdminError> {
        self.guard(&auth, &Requirement::permission("update-permission"))
            .await?;

        let body = body.0;
        if let Some(new_name) = &body.name {
            let existing = self
                .permission_store
                .find_by_name(new_name)
                .await
                .map_err(AdminError::from_internal_error)?;
            if existing.is_some_and(|p| p.id != id.0) {
                return Err(AdminError::duplicate_name("Permission"));
            }
        }

        let updated = self
            .permission_store
            .update(
                &id.0,
                PermissionUpdate {
                    name: body.name,
                    description: body.description,
                },
            )
            .await
            .map_err(AdminError::from_internal_error)?
            .ok_or_else(|| AdminError::not_found("Permission"))?;

        Ok(Json(PermissionView::from(updated)))
    }

    /// Delete a permission, detaching it from every role and user
    #[oai(path = "/:id", method = "delete", tag = "PermissionTags::Permissions")]
    async fn delete(
        &self,
        auth: BearerAuth,
        id: Path<String>,
    ) -> Result<Json<MessageResponse>, AdminError> {
        self.guard(&auth, &Requirement::permission("delete-permission"))
            .await?;

        let removed = self
            .permission_store
            .delete(&id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        if !removed {
            return Err(AdminError::not_found("Permission"));
        }

        tracing::info!(permission_id = %id.0, "Permission deleted");

        Ok(Json(MessageResponse {
            message: "Permission deleted successfully".to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use poem_openapi::auth::Bearer;
    use sea_orm::ActiveValue::Set;
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, EntityTrait, ModelTrait};

    use crate::authz::Authorizer;
    use crate::services::TokenService;
    use crate::stores::UserStore;
    use crate::types::db::{permission, role, role_permission, user};

    const TEST_SECRET: &str = "test-secret-key-minimum-32-characters-long";

    struct TestHarness {
        api: PermissionApi,
        db: DatabaseConnection,
        token_service: TokenService,
    }

    impl TestHarness {
        fn token_for(&self, user_id: &str) -> BearerAuth {
            BearerAuth(Bearer {
                token: self.token_service.issue(user_id).unwrap(),
            })
        }
    }

    async fn make_harness() -> TestHarness {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
        let now = Utc::now().timestamp();

        role::ActiveModel {
            id: Set("role-admin".to_string()),
            name: Set("admin".to_string()),
            description: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await
        .unwrap();
        user::ActiveModel {
            id: Set("admin-1".to_string()),
            name: Set("Admin".to_string()),
            email: Set("admin@example.com".to_string()),
            password_hash: Set("irrelevant".to_string()),
            is_active: Set(true),
            role_id: Set(Some("role-admin".to_string())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await
        .unwrap();

        let token_service = Arc::new(TokenService::new(TEST_SECRET.to_string(), 7));
        let auth_service = Arc::new(AuthService::new(
            Arc::new(UserStore::new(db.clone())),
            token_service,
            Arc::new(Authorizer::with_builtin_grants()),
        ));

        TestHarness {
            api: PermissionApi::new(Arc::new(PermissionStore::new(db.clone())), auth_service),
            db,
            token_service: TokenService::new(TEST_SECRET.to_string(), 7),
        }
    }

    #[tokio::test]
    async fn test_create_then_list_permissions() {
        let harness = make_harness().await;

        harness
            .api
            .create(
                harness.token_for("admin-1"),
                Json(CreatePermissionRequest {
                    name: "read-report".to_string(),
                    description: Some("View reports".to_string()),
                }),
            )
            .await
            .unwrap();

        let response = harness.api.list(harness.token_for("admin-1")).await.unwrap();

        assert_eq!(response.permissions.len(), 1);
        assert_eq!(response.permissions[0].name, "read-report");
    }

    #[tokio::test]
    async fn test_create_duplicate_name_is_rejected() {
        let harness = make_harness().await;

        harness
            .api
            .create(
                harness.token_for("admin-1"),
                Json(CreatePermissionRequest {
                    name: "read-report".to_string(),
                    description: None,
                }),
            )
            .await
            .unwrap();

        let result = harness
            .api
            .create(
                harness.token_for("admin-1"),
                Json(CreatePermissionRequest {
                    name: "read-report".to_string(),
                    description: None,
                }),
            )
            .await;

        assert!(matches!(result, Err(AdminError::DuplicateName(_))));
    }

    #[tokio::test]
    async fn test_update_renames_permission() {
        let harness = make_harness().await;

        let created = harness
            .api
            .create(
                harness.token_for("admin-1"),
                Json(CreatePermissionRequest {
                    name: "read-report".to_string(),
                    description: None,
                }),
            )
            .await
            .unwrap();

        let updated = harness
            .api
            .update(
                harness.token_for("admin-1"),
                Path(created.id.clone()),
                Json(UpdatePermissionRequest {
                    name: Some("view-report".to_string()),
                    description: None,
                }),
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "view-report");
        assert_eq!(updated.id, created.id);
    }

    #[tokio::test]
    async fn test_delete_detaches_permission_from_roles() {
        let harness = make_harness().await;

        let created = harness
            .api
            .create(
                harness.token_for("admin-1"),
                Json(CreatePermissionRequest {
                    name: "read-report".to_string(),
                    description: None,
                }),
            )
            .await
            .unwrap();
        role_permission::ActiveModel {
            role_id: Set("role-admin".to_string()),
            permission_id: Set(created.id.clone()),
        }
        .insert(&harness.db)
        .await
        .unwrap();

        harness
            .api
            .delete(harness.token_for("admin-1"), Path(created.id.clone()))
            .await
            .unwrap();

        // The join row is gone along with the permission
        let admin_role = role::Entity::find_by_id("role-admin".to_string())
            .one(&harness.db)
            .await
            .unwrap()
            .unwrap();
        let remaining = admin_role
            .find_related(permission::Entity)
            .all(&harness.db)
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_permission_is_not_found() {
        let harness = make_harness().await;

        let result = harness
            .api
            .delete(harness.token_for("admin-1"), Path("ghost".to_string()))
            .await;

        assert!(matches!(result, Err(AdminError::NotFound(_))));
    }
}
