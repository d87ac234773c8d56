// DTO layer - Request/response models for the HTTP API
pub mod auth;
pub mod common;
pub mod permission;
pub mod profile;
pub mod role;
pub mod user;
