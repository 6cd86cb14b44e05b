use core_catalog::CatalogError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

pub type Result<T> = std::result::Result<T, MatchError>;
