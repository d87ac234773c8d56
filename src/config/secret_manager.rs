use std::fmt;

/// Secret loading failures
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("Required secret '{secret_name}' is missing")]
    Missing { secret_name: String },

    #[error("Secret '{secret_name}' must be at least {expected} characters, got {actual}")]
    InvalidLength {
        secret_name: String,
        expected: usize,
        actual: usize,
    },
}

/// Centralized manager for application secrets
///
/// Secrets come from the environment only and are validated at
/// startup, so a misconfigured deployment fails before it serves a
/// single request.
pub struct SecretManager {
    jwt_secret: String,
    pepper: String,
}

const JWT_SECRET_VAR: &str = "JWT_SECRET";
const JWT_SECRET_MIN_LENGTH: usize = 32;
const PEPPER_VAR: &str = "PEPPER";
const PEPPER_MIN_LENGTH: usize = 16;

impl SecretManager {
    /// Load and validate all secrets from the environment
    ///
    /// # Errors
    /// Returns `SecretError` if a required secret is missing or too short
    pub fn init() -> Result<Self, SecretError> {
        let jwt_secret = Self::load_secret(JWT_SECRET_VAR, JWT_SECRET_MIN_LENGTH)?;
        let pepper = Self::load_secret(PEPPER_VAR, PEPPER_MIN_LENGTH)?;

        Ok(Self { jwt_secret, pepper })
    }

    /// Get the JWT signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Get the pepper for password hashing
    pub fn pepper(&self) -> &str {
        &self.pepper
    }

    fn load_secret(name: &str, min_length: usize) -> Result<String, SecretError> {
        let value = std::env::var(name).map_err(|_| SecretError::Missing {
            secret_name: name.to_string(),
        })?;

        if value.len() < min_length {
            return Err(SecretError::InvalidLength {
                secret_name: name.to_string(),
                expected: min_length,
                actual: value.len(),
            });
        }

        Ok(value)
    }
}

impl fmt::Debug for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretManager")
            .field("jwt_secret", &"<redacted>")
            .field("pepper", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretManager {{ secrets_loaded: 2 }}")
    }
}
