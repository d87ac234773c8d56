use std::env;
use std::fmt;

/// Bootstrap configuration failures
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Invalid setting '{setting_name}': {reason}")]
    InvalidSetting {
        setting_name: String,
        reason: String,
    },
}

/// Bootstrap settings for infrastructure configuration
///
/// These are the settings needed before anything else exists: where
/// the database lives, where to listen, and how long issued tokens
/// stay valid.
pub struct BootstrapSettings {
    database_url: String,
    server_host: String,
    server_port: u16,
    jwt_expiry_days: i64,
}

impl BootstrapSettings {
    /// Load bootstrap settings from environment variables
    ///
    /// Every setting has a default, so an empty environment yields a
    /// working local configuration.
    pub fn from_env() -> Result<Self, SettingsError> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://rbac.db?mode=rwc".to_string());
        if database_url.is_empty() {
            return Err(SettingsError::InvalidSetting {
                setting_name: "DATABASE_URL".to_string(),
                reason: "cannot be empty".to_string(),
            });
        }

        let server_host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        if server_host.is_empty() {
            return Err(SettingsError::InvalidSetting {
                setting_name: "HOST".to_string(),
                reason: "cannot be empty".to_string(),
            });
        }

        let port_value = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let server_port: u16 = port_value
            .parse()
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| SettingsError::InvalidSetting {
                setting_name: "PORT".to_string(),
                reason: format!("expected port number between 1 and 65535, got '{}'", port_value),
            })?;

        let expiry_value = env::var("JWT_EXPIRES_DAYS").unwrap_or_else(|_| "7".to_string());
        let jwt_expiry_days: i64 = expiry_value
            .parse()
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| SettingsError::InvalidSetting {
                setting_name: "JWT_EXPIRES_DAYS".to_string(),
                reason: format!("expected a positive number of days, got '{}'", expiry_value),
            })?;

        Ok(Self {
            database_url,
            server_host,
            server_port,
            jwt_expiry_days,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn server_host(&self) -> &str {
        &self.server_host
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn jwt_expiry_days(&self) -> i64 {
        self.jwt_expiry_days
    }
}

impl fmt::Debug for BootstrapSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapSettings")
            .field("database_url", &self.database_url)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("jwt_expiry_days", &self.jwt_expiry_days)
            .finish()
    }
}
