//! Error taxonomy shared by the service and every transport.

use thiserror::Error;

/// Failure of an item operation.
///
/// | Variant | Meaning | HTTP |
/// |---------|---------|------|
/// | [`InvalidInput`](ItemError::InvalidInput) | payload failed validation | 400 |
/// | [`NotFound`](ItemError::NotFound) | no item has the requested id | 404 |
/// | [`StorageUnavailable`](ItemError::StorageUnavailable) | the backing store could not serve the query | 500 |
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("item not found: {0}")]
    NotFound(i64),

    /// The wrapped error carries backend detail and must not reach clients.
    #[error("storage unavailable")]
    StorageUnavailable(#[source] anyhow::Error),
}

impl ItemError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ItemError::InvalidInput(message.into())
    }

    pub fn storage(err: impl Into<anyhow::Error>) -> Self {
        ItemError::StorageUnavailable(err.into())
    }
}

pub type ItemResult<T> = std::result::Result<T, ItemError>;
