use poem_openapi::Object;

/// Response model for health check endpoint
#[derive(Object, Debug)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,

    /// Timestamp of the health check (ISO 8601 format)
    pub timestamp: String,
}

/// Generic success message
#[derive(Object, Debug)]
pub struct MessageResponse {
    /// Success message
    pub message: String,
}

/// Pagination metadata for list endpoints
#[derive(Object, Debug)]
pub struct Pagination {
    /// Current page (1-based)
    pub page: u64,

    /// Page size
    pub limit: u64,

    /// Total number of items
    pub total: u64,

    /// Total number of pages
    pub pages: u64,
}
