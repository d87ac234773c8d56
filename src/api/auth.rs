use poem_openapi::{auth::Bearer, payload::Json, OpenApi, SecurityScheme, Tags};
use std::sync::Arc;

use crate::authz::resolver;
use crate::errors::auth::AuthError;
use crate::services::{AuthService, TokenService};
use crate::stores::{CredentialStore, RoleStore};
use crate::types::dto::auth::{
    ChangePasswordRequest, LoginRequest, MyPermissionsResponse, RegisterRequest, RegisterResponse,
    TokenResponse,
};
use crate::types::dto::common::MessageResponse;
use crate::types::dto::user::UserView;

/// Role assigned to self-registered accounts when it exists
const DEFAULT_ROLE: &str = "user";

/// JWT Bearer token authentication
#[derive(SecurityScheme)]
#[oai(
    ty = "bearer",
    key_name = "Authorization",
    key_in = "header",
    bearer_format = "JWT"
)]
pub struct BearerAuth(pub Bearer);

/// API tags for authentication endpoints
#[derive(Tags)]
enum AuthTags {
    /// Authentication endpoints
    Authentication,
}

/// Authentication API endpoints
pub struct AuthApi {
    credential_store: Arc<CredentialStore>,
    role_store: Arc<RoleStore>,
    token_service: Arc<TokenService>,
    auth_service: Arc<AuthService>,
}

impl AuthApi {
    /// Create a new AuthApi
    pub fn new(
        credential_store: Arc<CredentialStore>,
        role_store: Arc<RoleStore>,
        token_service: Arc<TokenService>,
        auth_service: Arc<AuthService>,
    ) -> Self {
        Self {
            credential_store,
            role_store,
            token_service,
            auth_service,
        }
    }
}

#[OpenApi(prefix_path = "/auth")]
impl AuthApi {
    /// Register a new account and receive an authentication token
    #[oai(path = "/register", method = "post", tag = "AuthTags::Authentication")]
    async fn register(
        &self,
        body: Json<RegisterRequest>,
    ) -> Result<Json<RegisterResponse>, AuthError> {
        // New accounts get the default role when one is configured;
        // without it they start with no role at all.
        let default_role = self
            .role_store
            .find_by_name(DEFAULT_ROLE)
            .await
            .map_err(AuthError::from_internal_error)?;

        let body = body.0;
        let created = self
            .credential_store
            .register(
                body.name,
                body.email,
                body.password,
                default_role.as_ref().map(|r| r.id.clone()),
            )
            .await?;

        let token = self
            .token_service
            .issue(&created.id)
            .map_err(AuthError::from_internal_error)?;

        tracing::info!(user_id = %created.id, "New account registered");

        Ok(Json(RegisterResponse {
            id: created.id,
            name: created.name,
            email: created.email,
            role: default_role.map(|r| r.name),
            token,
        }))
    }

    /// Login with email and password to receive an authentication token
    #[oai(path = "/login", method = "post", tag = "AuthTags::Authentication")]
    async fn login(&self, body: Json<LoginRequest>) -> Result<Json<TokenResponse>, AuthError> {
        let user = self
            .credential_store
            .verify_credentials(&body.email, &body.password)
            .await?;

        // A correct password does not help a deactivated account; the
        // response names the reason, unlike a bad credential.
        if !user.is_active {
            return Err(AuthError::account_disabled());
        }

        let token = self
            .token_service
            .issue(&user.id)
            .map_err(AuthError::from_internal_error)?;

        Ok(Json(TokenResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.token_service.expires_in_seconds(),
        }))
    }

    /// Logout the current session
    ///
    /// Tokens are stateless, so logout only confirms the caller held a
    /// valid one; the client discards it.
    #[oai(path = "/logout", method = "post", tag = "AuthTags::Authentication")]
    async fn logout(&self, auth: BearerAuth) -> Result<Json<MessageResponse>, AuthError> {
        self.auth_service.authenticate(&auth.0.token).await?;

        Ok(Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }))
    }

    /// Return the authenticated user with role and permissions
    #[oai(path = "/me", method = "get", tag = "AuthTags::Authentication")]
    async fn me(&self, auth: BearerAuth) -> Result<Json<UserView>, AuthError> {
        let access = self.auth_service.authenticate(&auth.0.token).await?;

        Ok(Json(UserView::from(access)))
    }

    /// Change the authenticated user's password
    #[oai(
        path = "/change-password",
        method = "post",
        tag = "AuthTags::Authentication"
    )]
    async fn change_password(
        &self,
        auth: BearerAuth,
        body: Json<ChangePasswordRequest>,
    ) -> Result<Json<MessageResponse>, AuthError> {
        let access = self.auth_service.authenticate(&auth.0.token).await?;

        self.credential_store
            .change_password(&access.user.id, &body.old_password, &body.new_password)
            .await?;

        Ok(Json(MessageResponse {
            message: "Password changed successfully".to_string(),
        }))
    }

    /// Return the authenticated user's effective permission set
    #[oai(
        path = "/my-permissions",
        method = "get",
        tag = "AuthTags::Authentication"
    )]
    async fn my_permissions(
        &self,
        auth: BearerAuth,
    ) -> Result<Json<MyPermissionsResponse>, AuthError> {
        let access = self.auth_service.authenticate(&auth.0.token).await?;

        let mut permissions: Vec<String> =
            resolver::effective_permissions(&access).into_iter().collect();
        permissions.sort();
        let role = access.role_name().map(String::from);

        Ok(Json(MyPermissionsResponse {
            user: UserView::from(access),
            role,
            permissions,
        }))
    }
}
