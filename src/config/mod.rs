// Configuration layer - bootstrap settings, secrets, logging, database
pub mod bootstrap_settings;
pub mod database;
pub mod logging;
pub mod secret_manager;

pub use bootstrap_settings::{BootstrapSettings, SettingsError};
pub use database::{init_database, migrate_database};
pub use logging::{init_logging, LoggingError};
pub use secret_manager::{SecretError, SecretManager};
