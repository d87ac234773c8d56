use thiserror::Error;

/// Database infrastructure failures
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database operation '{operation}' failed: {source}")]
    Operation {
        operation: String,
        source: sea_orm::DbErr,
    },
}
