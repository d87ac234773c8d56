use thiserror::Error;

pub mod credential;
pub mod database;

pub use credential::CredentialError;
pub use database::DatabaseError;

/// Internal error type for store and service operations
///
/// Not exposed via the API - endpoints convert to AuthError or
/// AdminError at the boundary. Error messages never contain tokens or
/// password hashes.
#[derive(Error, Debug)]
pub enum InternalError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("Crypto error: {operation} failed: {message}")]
    Crypto { operation: String, message: String },
}

impl InternalError {
    pub fn database(operation: &str, source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::Operation {
            operation: operation.to_string(),
            source,
        })
    }

    pub fn crypto(operation: &str, message: String) -> InternalError {
        InternalError::Crypto {
            operation: operation.to_string(),
            message,
        }
    }
}
