use poem_openapi::{payload::Json, ApiResponse, Object};
use std::fmt;

use crate::errors::api::auth::AuthError;
use crate::errors::internal::InternalError;

/// Standardized error response for management endpoints
#[derive(Object, Debug)]
pub struct AdminErrorResponse {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

/// Error type for the user/role/permission management endpoints
///
/// Covers both the authentication failures that precede a handler and
/// the CRUD failures inside it, since each endpoint exposes a single
/// error type.
#[derive(ApiResponse, Debug)]
pub enum AdminError {
    /// Invalid, expired or missing JWT
    #[oai(status = 401)]
    Unauthenticated(Json<AdminErrorResponse>),

    /// Account exists but is deactivated
    #[oai(status = 401)]
    AccountDisabled(Json<AdminErrorResponse>),

    /// Authenticated, but the required permission is absent
    #[oai(status = 403)]
    Forbidden(Json<AdminErrorResponse>),

    /// Requested entity does not exist
    #[oai(status = 404)]
    NotFound(Json<AdminErrorResponse>),

    /// Unique name constraint violated
    #[oai(status = 400)]
    DuplicateName(Json<AdminErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<AdminErrorResponse>),
}

impl AdminError {
    /// Create an Unauthenticated error
    pub fn unauthenticated(message: String) -> Self {
        AdminError::Unauthenticated(Json(AdminErrorResponse {
            error: "unauthenticated".to_string(),
            message,
            status_code: 401,
        }))
    }

    /// Create an AccountDisabled error
    pub fn account_disabled() -> Self {
        AdminError::AccountDisabled(Json(AdminErrorResponse {
            error: "account_disabled".to_string(),
            message: "User account is deactivated".to_string(),
            status_code: 401,
        }))
    }

    /// Create a Forbidden error
    pub fn forbidden() -> Self {
        AdminError::Forbidden(Json(AdminErrorResponse {
            error: "forbidden".to_string(),
            message: "Access denied. You do not have permission to perform this action"
                .to_string(),
            status_code: 403,
        }))
    }

    /// Create a NotFound error
    pub fn not_found(entity: &str) -> Self {
        AdminError::NotFound(Json(AdminErrorResponse {
            error: "not_found".to_string(),
            message: format!("{} not found", entity),
            status_code: 404,
        }))
    }

    /// Create a DuplicateName error
    pub fn duplicate_name(entity: &str) -> Self {
        AdminError::DuplicateName(Json(AdminErrorResponse {
            error: "duplicate_name".to_string(),
            message: format!("{} already exists", entity),
            status_code: 400,
        }))
    }

    /// Create a generic internal server error
    ///
    /// Always returns a generic message without exposing internals.
    pub fn internal_server_error() -> Self {
        AdminError::InternalError(Json(AdminErrorResponse {
            error: "internal_error".to_string(),
            message: "An internal error occurred".to_string(),
            status_code: 500,
        }))
    }

    /// Convert an InternalError into the API-facing error
    pub fn from_internal_error(err: InternalError) -> Self {
        tracing::error!("Internal error in management operation: {}", err);
        Self::internal_server_error()
    }

    /// Map an authentication-pipeline failure onto this error type
    ///
    /// Management endpoints authenticate before handling; the auth
    /// failure keeps its status class and message.
    pub fn from_auth(err: AuthError) -> Self {
        match err {
            AuthError::AccountDisabled(_) => Self::account_disabled(),
            AuthError::Forbidden(_) => Self::forbidden(),
            AuthError::LookupFailure(_) | AuthError::InternalError(_) => {
                Self::internal_server_error()
            }
            other => Self::unauthenticated(other.message()),
        }
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        match self {
            AdminError::Unauthenticated(json) => json.0.message.clone(),
            AdminError::AccountDisabled(json) => json.0.message.clone(),
            AdminError::Forbidden(json) => json.0.message.clone(),
            AdminError::NotFound(json) => json.0.message.clone(),
            AdminError::DuplicateName(json) => json.0.message.clone(),
            AdminError::InternalError(json) => json.0.message.clone(),
        }
    }
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
