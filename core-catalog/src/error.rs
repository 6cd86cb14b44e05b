use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Operation not available: {0}")]
    NotAvailable(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
