use poem_openapi::param::Path;
use poem_openapi::{payload::Json, OpenApi, Tags};
use std::sync::Arc;

use crate::api::auth::BearerAuth;
use crate::authz::{Action, Requirement};
use crate::errors::admin::AdminError;
use crate::services::AuthService;
use crate::stores::user_store::UserUpdate;
use crate::stores::UserStore;
use crate::types::dto::profile::{ProfileView, UpdateProfileRequest};
use crate::types::internal::access::UserWithAccess;

/// API tags for profile endpoints
#[derive(Tags)]
enum ProfileTags {
    /// Profile endpoints
    Profiles,
}

/// Profile API endpoints
///
/// Unlike the management endpoints these are guarded by the capability
/// grant table: access depends on the caller's role and on whether the
/// profile is their own.
pub struct ProfileApi {
    user_store: Arc<UserStore>,
    auth_service: Arc<AuthService>,
}

impl ProfileApi {
    /// Create a new ProfileApi
    pub fn new(user_store: Arc<UserStore>, auth_service: Arc<AuthService>) -> Self {
        Self {
            user_store,
            auth_service,
        }
    }

    async fn guard_capability(
        &self,
        auth: &BearerAuth,
        action: Action,
        owner_id: &str,
    ) -> Result<UserWithAccess, AdminError> {
        let requirement = Requirement::Capability {
            action,
            resource: "profile".to_string(),
            owner_id: Some(owner_id.to_string()),
        };
        self.auth_service
            .authenticate_and_require(&auth.0.token, &requirement)
            .await
            .map_err(AdminError::from_auth)
    }

    fn profile_view(access: UserWithAccess) -> ProfileView {
        let role = access.role_name().map(String::from);
        ProfileView {
            user_id: access.user.id,
            name: access.user.name,
            email: access.user.email,
            role,
        }
    }
}

#[OpenApi(prefix_path = "/profiles")]
impl ProfileApi {
    /// Read a user's profile
    ///
    /// Everyone may read their own profile; reading someone else's
    /// requires a role whose grants cover any profile.
    #[oai(path = "/:user_id", method = "get", tag = "ProfileTags::Profiles")]
    async fn get(
        &self,
        auth: BearerAuth,
        user_id: Path<String>,
    ) -> Result<Json<ProfileView>, AdminError> {
        self.guard_capability(&auth, Action::Read, &user_id.0)
            .await?;

        let target = self
            .user_store
            .load_with_access(&user_id.0)
            .await
            .map_err(AdminError::from_internal_error)?
            .ok_or_else(|| AdminError::not_found("Profile"))?;

        Ok(Json(Self::profile_view(target)))
    }

    /// Update a user's profile
    #[oai(path = "/:user_id", method = "put", tag = "ProfileTags::Profiles")]
    async fn update(
        &self,
        auth: BearerAuth,
        user_id: Path<String>,
        body: Json<UpdateProfileRequest>,
    ) -> Result<Json<ProfileView>, AdminError> {
        self.guard_capability(&auth, Action::Update, &user_id.0)
            .await?;

        let updated = self
            .user_store
            .update(
                &user_id.0,
                UserUpdate {
                    name: Some(body.0.name),
                    ..Default::default()
                },
            )
            .await
            .map_err(AdminError::from_internal_error)?
            .ok_or_else(|| AdminError::not_found("Profile"))?;

        Ok(Json(Self::profile_view(updated)))
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
    use crate::types::db::{role, user};

    const TEST_SECRET: &str = "test-secret-key-minimum-32-characters-long";

    struct TestHarness {
        api: ProfileApi,
        token_service: TokenService,
    }

    impl TestHarness {
        fn token_for(&self, user_id: &str) -> BearerAuth {
            BearerAuth(Bearer {
                token: self.token_service.issue(user_id).unwrap(),
            })
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

    async fn make_harness() -> TestHarness {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        insert_role(&db, "role-user", "user").await;
        insert_role(&db, "role-moderator", "moderator").await;
        insert_role(&db, "role-admin", "admin").await;
        insert_user(&db, "plain-1", Some("role-user")).await;
        insert_user(&db, "plain-2", Some("role-user")).await;
        insert_user(&db, "mod-1", Some("role-moderator")).await;
        insert_user(&db, "admin-1", Some("role-admin")).await;
        insert_user(&db, "roleless-1", None).await;

        let token_service = Arc::new(TokenService::new(TEST_SECRET.to_string(), 7));
        let user_store = Arc::new(UserStore::new(db));
        let auth_service = Arc::new(AuthService::new(
            user_store.clone(),
            token_service,
            Arc::new(Authorizer::with_builtin_grants()),
        ));

        TestHarness {
            api: ProfileApi::new(user_store, auth_service),
            token_service: TokenService::new(TEST_SECRET.to_string(), 7),
        }
    }

    #[tokio::test]
    async fn test_user_reads_own_profile() {
        let harness = make_harness().await;

        let response = harness
            .api
            .get(harness.token_for("plain-1"), Path("plain-1".to_string()))
            .await
            .unwrap();

        assert_eq!(response.user_id, "plain-1");
        assert_eq!(response.role.as_deref(), Some("user"));
    }

    #[tokio::test]
    async fn test_user_cannot_read_someone_elses_profile() {
        let harness = make_harness().await;

        let result = harness
            .api
            .get(harness.token_for("plain-1"), Path("plain-2".to_string()))
            .await;

        assert!(matches!(result, Err(AdminError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_moderator_reads_any_profile() {
        let harness = make_harness().await;

        let response = harness
            .api
            .get(harness.token_for("mod-1"), Path("plain-1".to_string()))
            .await
            .unwrap();

        assert_eq!(response.user_id, "plain-1");
    }

    #[tokio::test]
    async fn test_roleless_user_is_treated_as_base_role() {
        let harness = make_harness().await;

        // Own profile works through the base role's own-scope grant
        let own = harness
            .api
            .get(
                harness.token_for("roleless-1"),
                Path("roleless-1".to_string()),
            )
            .await;
        assert!(own.is_ok());

        // Someone else's does not
        let other = harness
            .api
            .get(harness.token_for("roleless-1"), Path("plain-1".to_string()))
            .await;
        assert!(matches!(other, Err(AdminError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_user_updates_own_profile() {
        let harness = make_harness().await;

        let response = harness
            .api
            .update(
                harness.token_for("plain-1"),
                Path("plain-1".to_string()),
                Json(UpdateProfileRequest {
                    name: "Renamed".to_string(),
                }),
            )
            .await
            .unwrap();

        assert_eq!(response.name, "Renamed");
    }

    #[tokio::test]
    async fn test_moderator_cannot_update_someone_elses_profile() {
        let harness = make_harness().await;

        // moderator holds updateOwn(profile) but not updateAny
        let result = harness
            .api
            .update(
                harness.token_for("mod-1"),
                Path("plain-1".to_string()),
                Json(UpdateProfileRequest {
                    name: "Hijacked".to_string(),
                }),
            )
            .await;

        assert!(matches!(result, Err(AdminError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_admin_updates_any_profile() {
        let harness = make_harness().await;

        let response = harness
            .api
            .update(
                harness.token_for("admin-1"),
                Path("plain-1".to_string()),
                Json(UpdateProfileRequest {
                    name: "Renamed by admin".to_string(),
                }),
            )
            .await
            .unwrap();

        assert_eq!(response.name, "Renamed by admin");
    }
}
