use core_catalog::{CatalogError, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("Unsupported item kind: {kind}")]
    UnsupportedItemKind { kind: String },

    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, CollectionError>;
