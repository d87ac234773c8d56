use std::sync::Arc;

use crate::authz::{Authorizer, Decision, Requirement};
use crate::errors::auth::AuthError;
use crate::errors::internal::CredentialError;
use crate::services::TokenService;
use crate::stores::UserStore;
use crate::types::internal::access::UserWithAccess;

/// Authentication service that turns a bearer token into a loaded user
/// and checks route requirements against it
///
/// Every request re-reads the identity store, so a role change or a
/// deactivation takes effect on the very next request.
pub struct AuthService {
    user_store: Arc<UserStore>,
    token_service: Arc<TokenService>,
    authorizer: Arc<Authorizer>,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        user_store: Arc<UserStore>,
        token_service: Arc<TokenService>,
        authorizer: Arc<Authorizer>,
    ) -> Self {
        Self {
            user_store,
            token_service,
            authorizer,
        }
    }

    /// Resolve a bearer token to a full identity snapshot
    ///
    /// # Returns
    /// * `Ok(UserWithAccess)` - Verified, known and active subject
    /// * `Err(AuthError)` - InvalidToken, ExpiredToken, AccountDisabled,
    ///   or LookupFailure when the store is down
    pub async fn authenticate(&self, token: &str) -> Result<UserWithAccess, AuthError> {
        let claims = self
            .token_service
            .verify(token)
            .map_err(|e| AuthError::from_internal_error(e.into()))?;

        let access = self
            .user_store
            .load_with_access(&claims.sub)
            .await
            .map_err(AuthError::from_internal_error)?
            .ok_or_else(|| {
                // An unknown subject is reported exactly like a bad
                // token; the id is logged, not returned.
                AuthError::from_internal_error(
                    CredentialError::SubjectNotFound(claims.sub.clone()).into(),
                )
            })?;

        if !access.user.is_active {
            return Err(AuthError::from_internal_error(
                CredentialError::AccountDisabled(access.user.id.clone()).into(),
            ));
        }

        Ok(access)
    }

    /// Check a route requirement against an authenticated user
    pub fn require(
        &self,
        access: &UserWithAccess,
        requirement: &Requirement,
    ) -> Result<(), AuthError> {
        match self.authorizer.check(access, requirement) {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(AuthError::forbidden()),
        }
    }

    /// Authenticate and check a requirement in one step
    pub async fn authenticate_and_require(
        &self,
        token: &str,
        requirement: &Requirement,
    ) -> Result<UserWithAccess, AuthError> {
        let access = self.authenticate(token).await?;
        self.require(&access, requirement)?;
        Ok(access)
    }
}
