use poem_openapi::param::Path;
use poem_openapi::{payload::Json, OpenApi, Tags};
use std::sync::Arc;

use crate::api::auth::BearerAuth;
use crate::authz::Requirement;
use crate::errors::admin::AdminError;
use crate::services::AuthService;
use crate::stores::role_store::RoleUpdate;
use crate::stores::RoleStore;
use crate::types::dto::common::MessageResponse;
use crate::types::dto::role::{
    CreateRoleRequest, RoleListResponse, RoleView, UpdateRoleRequest,
};
use crate::types::internal::access::UserWithAccess;

/// API tags for role management endpoints
#[derive(Tags)]
enum RoleTags {
    /// Role management endpoints
    Roles,
}

/// Role management API endpoints
pub struct RoleApi {
    role_store: Arc<RoleStore>,
    auth_service: Arc<AuthService>,
}

impl RoleApi {
    /// Create a new RoleApi
    pub fn new(role_store: Arc<RoleStore>, auth_service: Arc<AuthService>) -> Self {
        Self {
            role_store,
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

#[OpenApi(prefix_path = "/roles")]
impl RoleApi {
    /// List all roles with their permission sets
    #[oai(path = "/", method = "get", tag = "RoleTags::Roles")]
    async fn list(&self, auth: BearerAuth) -> Result<Json<RoleListResponse>, AdminError> {
        self.guard(&auth, &Requirement::permission("read-role"))
            .await?;

        let roles = self
            .role_store
            .list_with_permissions()
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(RoleListResponse {
            roles: roles
                .into_iter()
                .map(|(role, permissions)| RoleView::from_model(role, permissions))
                .collect(),
        }))
    }

    /// Get a single role with its permission set
    #[oai(path = "/:id", method = "get", tag = "RoleTags::Roles")]
    async fn get(&self, auth: BearerAuth, id: Path<String>) -> Result<Json<RoleView>, AdminError> {
        self.guard(&auth, &Requirement::permission("read-role"))
            .await?;

        let (role, permissions) = self
            .role_store
            .find_with_permissions(&id.0)
            .await
            .map_err(AdminError::from_internal_error)?
            .ok_or_else(|| AdminError::not_found("Role"))?;

        Ok(Json(RoleView::from_model(role, permissions)))
    }

    /// Create a role, optionally with an initial permission set
    #[oai(path = "/", method = "post", tag = "RoleTags::Roles")]
    async fn create(
        &self,
        auth: BearerAuth,
        body: Json<CreateRoleRequest>,
    ) -> Result<Json<RoleView>, AdminError> {
        self.guard(&auth, &Requirement::permission("create-role"))
            .await?;

        let body = body.0;
        let existing = self
            .role_store
            .find_by_name(&body.name)
            .await
            .map_err(AdminError::from_internal_error)?;
        if existing.is_some() {
            return Err(AdminError::duplicate_name("Role"));
        }

        let (role, permissions) = self
            .role_store
            .create(
                body.name,
                body.description,
                &body.permission_ids.unwrap_or_default(),
            )
            .await
            .map_err(AdminError::from_internal_error)?;

        tracing::info!(role_id = %role.id, "Role created");

        Ok(Json(RoleView::from_model(role, permissions)))
    }

    /// Update a role; a permission id list replaces its full set
    #[oai(path = "/:id", method = "put", tag = "RoleTags::Roles")]
    async fn update(
        &self,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<UpdateRoleRequest>,
    ) -> Result<Json<RoleView>, AdminError> {
        self.guard(&auth, &Requirement::permission("update-role"))
            .await?;

        let body = body.0;
        if let Some(new_name) = &body.name {
            let existing = self
                .role_store
                .find_by_name(new_name)
                .await
                .map_err(AdminError::from_internal_error)?;
            if existing.is_some_and(|r| r.id != id.0) {
                return Err(AdminError::duplicate_name("Role"));
            }
        }

        let (role, permissions) = self
            .role_store
            .update(
                &id.0,
                RoleUpdate {
                    name: body.name,
                    description: body.description,
                    permission_ids: body.permission_ids,
                },
            )
            .await
            .map_err(AdminError::from_internal_error)?
            .ok_or_else(|| AdminError::not_found("Role"))?;

        Ok(Json(RoleView::from_model(role, permissions)))
    }

    /// Delete a role; its users fall back to no role
    #[oai(path = "/:id", method = "delete", tag = "RoleTags::Roles")]
    async fn delete(
        &self,
        auth: BearerAuth,
        id: Path<String>,
    ) -> Result<Json<MessageResponse>, AdminError> {
        self.guard(&auth, &Requirement::permission("delete-role"))
            .await?;

        let removed = self
            .role_store
            .delete(&id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        if !removed {
            return Err(AdminError::not_found("Role"));
        }

        tracing::info!(role_id = %id.0, "Role deleted");

        Ok(Json(MessageResponse {
            message: "Role deleted successfully".to_string(),
        }))
    }
}
