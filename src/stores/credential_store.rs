use argon2::{
    password_hash::SaltString, Algorithm, Argon2, Params, PasswordHash, PasswordHasher,
    PasswordVerifier, Version,
};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::errors::auth::AuthError;
use crate::types::db::user::{self, ActiveModel, Entity as User};

/// CredentialStore manages account creation and password verification
///
/// Passwords are hashed with Argon2id, keyed with a process-wide
/// pepper supplied by the SecretManager.
pub struct CredentialStore {
    db: DatabaseConnection,
    password_pepper: String,
}

impl CredentialStore {
    /// Create a new CredentialStore with the given database connection
    /// and password pepper
    pub fn new(db: DatabaseConnection, password_pepper: String) -> Self {
        Self { db, password_pepper }
    }

    /// Register a new user
    ///
    /// # Arguments
    /// * `name` - Display name
    /// * `email` - Email address, must be unique
    /// * `password` - Plaintext password to hash and store
    /// * `role_id` - Role to assign, typically the default "user" role
    ///
    /// # Returns
    /// * `Ok(user::Model)` - The created user row
    /// * `Err(AuthError)` - DuplicateEmail if the email is taken
    pub async fn register(
        &self,
        name: String,
        email: String,
        password: String,
        role_id: Option<String>,
    ) -> Result<user::Model, AuthError> {
        let existing = User::find()
            .filter(user::Column::Email.eq(&email))
            .one(&self.db)
            .await
            .map_err(|e| AuthError::internal_error(format!("Database error: {}", e)))?;

        if existing.is_some() {
            return Err(AuthError::duplicate_email());
        }

        let user_id = Uuid::new_v4().to_string();
        let password_hash = self.hash_password(&password)?;
        let now = Utc::now().timestamp();

        let new_user = ActiveModel {
            id: Set(user_id),
            name: Set(name),
            email: Set(email),
            password_hash: Set(password_hash),
            is_active: Set(true),
            role_id: Set(role_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = new_user.insert(&self.db).await.map_err(|e| {
            if e.to_string().contains("UNIQUE") {
                AuthError::duplicate_email()
            } else {
                AuthError::internal_error(format!("Database error: {}", e))
            }
        })?;

        Ok(created)
    }

    /// Verify email and password, returning the user row on success
    ///
    /// Whether the email is unknown or the password wrong, the caller
    /// sees the same InvalidCredentials error.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<user::Model, AuthError> {
        let found = User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|_| AuthError::invalid_credentials())?;

        let found = found.ok_or_else(AuthError::invalid_credentials)?;

        self.verify_password(password, &found.password_hash)
            .map_err(|_| AuthError::invalid_credentials())?;

        Ok(found)
    }

    /// Change a user's password after verifying the old one
    pub async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let found = User::find_by_id(user_id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| AuthError::internal_error(format!("Database error: {}", e)))?
            .ok_or_else(AuthError::invalid_credentials)?;

        self.verify_password(old_password, &found.password_hash)
            .map_err(|_| AuthError::invalid_credentials())?;

        let new_hash = self.hash_password(new_password)?;

        let mut active: user::ActiveModel = found.into();
        active.password_hash = Set(new_hash);
        active.updated_at = Set(Utc::now().timestamp());
        active
            .update(&self.db)
            .await
            .map_err(|e| AuthError::internal_error(format!("Database error: {}", e)))?;

        Ok(())
    }

    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut rand_core::OsRng);
        let argon2 = self.argon2()?;

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::internal_error(format!("Password hashing error: {}", e)))?
            .to_string();

        Ok(password_hash)
    }

    fn verify_password(&self, password: &str, stored_hash: &str) -> Result<(), AuthError> {
        let parsed_hash =
            PasswordHash::new(stored_hash).map_err(|_| AuthError::invalid_credentials())?;
        let argon2 = self.argon2()?;

        argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::invalid_credentials())?;

        Ok(())
    }

    fn argon2(&self) -> Result<Argon2<'_>, AuthError> {
        Argon2::new_with_secret(
            self.password_pepper.as_bytes(),
            Algorithm::Argon2id,
            Version::V0x13,
            Params::default(),
        )
        .map_err(|e| AuthError::internal_error(format!("Failed to initialize Argon2: {}", e)))
    }
}
