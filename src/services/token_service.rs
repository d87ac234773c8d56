use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;

use crate::errors::internal::{CredentialError, InternalError};
use crate::types::internal::auth::Claims;

/// Manages bearer token issuance and verification
///
/// Tokens are HS256 JWTs carrying only the subject id and the
/// issued-at/expiry timestamps. Everything else about the user is
/// loaded fresh from the identity store on each request.
pub struct TokenService {
    jwt_secret: String,
    expiry_days: i64,
}

impl TokenService {
    /// Create a new TokenService with the given signing secret and
    /// token lifetime in days
    pub fn new(jwt_secret: String, expiry_days: i64) -> Self {
        Self {
            jwt_secret,
            expiry_days,
        }
    }

    /// Issue a signed token for the given subject id
    ///
    /// # Returns
    /// * `Result<String, InternalError>` - The encoded JWT or an error
    pub fn issue(&self, subject: &str) -> Result<String, InternalError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            exp: now + self.expires_in_seconds(),
            iat: now,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| InternalError::crypto("jwt_sign", e.to_string()))
    }

    /// Verify a token's signature and expiry, returning its claims
    ///
    /// # Returns
    /// * `Ok(Claims)` - Signature and expiry check out
    /// * `Err(CredentialError::ExpiredToken)` - Past its exp claim
    /// * `Err(CredentialError::InvalidToken)` - Anything else wrong with it
    pub fn verify(&self, token: &str) -> Result<Claims, CredentialError> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => CredentialError::ExpiredToken,
            _ => CredentialError::invalid_token("signature or structure check failed"),
        })?;

        Ok(token_data.claims)
    }

    /// Token lifetime in seconds, for the login response
    pub fn expires_in_seconds(&self) -> i64 {
        self.expiry_days * 24 * 60 * 60
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("jwt_secret", &"<redacted>")
            .field("expiry_days", &self.expiry_days)
            .finish()
    }
}

impl fmt::Display for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenService {{ expiry: {}days }}", self.expiry_days)
    }
}
