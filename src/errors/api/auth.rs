use poem_openapi::{payload::Json, ApiResponse, Object};
use std::fmt;

use crate::errors::internal::{CredentialError, InternalError};

/// Standardized error response for authentication endpoints
#[derive(Object, Debug)]
pub struct AuthErrorResponse {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

/// Authentication and authorization error types
#[derive(ApiResponse, Debug)]
pub enum AuthError {
    /// Invalid email or password
    #[oai(status = 401)]
    InvalidCredentials(Json<AuthErrorResponse>),

    /// Email address already registered
    #[oai(status = 400)]
    DuplicateEmail(Json<AuthErrorResponse>),

    /// Invalid or malformed JWT, or no matching subject
    #[oai(status = 401)]
    InvalidToken(Json<AuthErrorResponse>),

    /// JWT has expired
    #[oai(status = 401)]
    ExpiredToken(Json<AuthErrorResponse>),

    /// Account exists but is deactivated
    #[oai(status = 401)]
    AccountDisabled(Json<AuthErrorResponse>),

    /// Authenticated, but the required permission is absent
    #[oai(status = 403)]
    Forbidden(Json<AuthErrorResponse>),

    /// Identity store unavailable
    #[oai(status = 500)]
    LookupFailure(Json<AuthErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<AuthErrorResponse>),
}

impl AuthError {
    /// Create an InvalidCredentials error
    pub fn invalid_credentials() -> Self {
        AuthError::InvalidCredentials(Json(AuthErrorResponse {
            error: "invalid_credentials".to_string(),
            message: "Invalid email or password".to_string(),
            status_code: 401,
        }))
    }

    /// Create a DuplicateEmail error
    pub fn duplicate_email() -> Self {
        AuthError::DuplicateEmail(Json(AuthErrorResponse {
            error: "duplicate_email".to_string(),
            message: "User already exists with this email".to_string(),
            status_code: 400,
        }))
    }

    /// Create an InvalidToken error
    ///
    /// Also used when a valid token names an unknown subject, so the
    /// two cases are indistinguishable to callers.
    pub fn invalid_token() -> Self {
        AuthError::InvalidToken(Json(AuthErrorResponse {
            error: "invalid_token".to_string(),
            message: "Not authorized. Invalid token".to_string(),
            status_code: 401,
        }))
    }

    /// Create an ExpiredToken error
    pub fn expired_token() -> Self {
        AuthError::ExpiredToken(Json(AuthErrorResponse {
            error: "expired_token".to_string(),
            message: "Not authorized. Token has expired".to_string(),
            status_code: 401,
        }))
    }

    /// Create an AccountDisabled error
    pub fn account_disabled() -> Self {
        AuthError::AccountDisabled(Json(AuthErrorResponse {
            error: "account_disabled".to_string(),
            message: "User account is deactivated".to_string(),
            status_code: 401,
        }))
    }

    /// Create a Forbidden error
    pub fn forbidden() -> Self {
        AuthError::Forbidden(Json(AuthErrorResponse {
            error: "forbidden".to_string(),
            message: "Access denied. You do not have permission to perform this action"
                .to_string(),
            status_code: 403,
        }))
    }

    /// Create a LookupFailure error
    ///
    /// Distinct from a denial: the identity store could not answer.
    pub fn lookup_failure() -> Self {
        AuthError::LookupFailure(Json(AuthErrorResponse {
            error: "lookup_failure".to_string(),
            message: "Unable to load user identity".to_string(),
            status_code: 500,
        }))
    }

    /// Create an InternalError
    pub fn internal_error(message: String) -> Self {
        AuthError::InternalError(Json(AuthErrorResponse {
            error: "internal_error".to_string(),
            message,
            status_code: 500,
        }))
    }

    /// Convert an InternalError into the API-facing error
    ///
    /// This is the explicit conversion point from internal errors to
    /// the auth API surface. Infrastructure details are logged, never
    /// returned to clients.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            InternalError::Credential(CredentialError::ExpiredToken) => Self::expired_token(),
            InternalError::Credential(CredentialError::InvalidToken(_)) => Self::invalid_token(),
            // Deliberately identical to an invalid token
            InternalError::Credential(CredentialError::SubjectNotFound(_)) => Self::invalid_token(),
            InternalError::Credential(CredentialError::AccountDisabled(_)) => {
                Self::account_disabled()
            }
            InternalError::Database(_) => {
                tracing::error!("Identity lookup failed: {}", err);
                Self::lookup_failure()
            }
            InternalError::Crypto { operation, .. } => {
                tracing::error!("Crypto error in {}: {}", operation, err);
                Self::internal_error("An internal error occurred".to_string())
            }
        }
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        match self {
            AuthError::InvalidCredentials(json) => json.0.message.clone(),
            AuthError::DuplicateEmail(json) => json.0.message.clone(),
            AuthError::InvalidToken(json) => json.0.message.clone(),
            AuthError::ExpiredToken(json) => json.0.message.clone(),
            AuthError::AccountDisabled(json) => json.0.message.clone(),
            AuthError::Forbidden(json) => json.0.message.clone(),
            AuthError::LookupFailure(json) => json.0.message.clone(),
            AuthError::InternalError(json) => json.0.message.clone(),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
