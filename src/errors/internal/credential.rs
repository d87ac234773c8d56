use thiserror::Error;

/// Credential and token validation failures
///
/// Messages describe the failure class only - the token itself is
/// never embedded in an error.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Subject not found: {0}")]
    SubjectNotFound(String),

    #[error("Account is deactivated: {0}")]
    AccountDisabled(String),
}

impl CredentialError {
    pub fn invalid_token(reason: &str) -> Self {
        Self::InvalidToken(reason.to_string())
    }
}
