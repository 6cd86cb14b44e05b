use core_catalog::CatalogError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Target does not support removal")]
    RemovalUnsupported,

    #[error("No active playback device")]
    NoActiveDevice,

    #[error("Delivery failed after {attempts} retries: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<DeliveryError>,
    },

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DeliveryError>;
