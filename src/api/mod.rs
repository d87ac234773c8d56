// API layer - HTTP endpoint definitions
pub mod auth;
pub mod health;
pub mod permission;
pub mod profile;
pub mod role;
pub mod user;

pub use auth::{AuthApi, BearerAuth};
pub use health::HealthApi;
pub use permission::PermissionApi;
pub use profile::ProfileApi;
pub use role::RoleApi;
pub use user::UserApi;
