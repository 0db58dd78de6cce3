use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A key that a best-effort batch delete failed to remove, with the
/// store-reported cause.
#[derive(Debug, Clone)]
pub struct DeleteFailure {
    pub key: String,
    pub cause: String,
}

/// Faults raised by an [`ObjectStore`](crate::storage::ObjectStore) driver.
///
/// Drivers classify their SDK errors into these variants with typed error
/// inspection, never by matching on message strings.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("batch delete left {} object(s) behind", failed.len())]
    BatchDelete { failed: Vec<DeleteFailure> },

    #[error("store operation failed: {0}")]
    Operation(#[source] BoxError),
}

impl StoreError {
    pub fn operation(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Operation(Box::new(err))
    }
}

/// Caller-facing error taxonomy of the virtual filesystem layer.
///
/// Shape and existence errors (`InvalidPath`, `AlreadyExists`, `NotFound`,
/// `NotAFolder`, `NotAFile`) are detected before any mutating store call is
/// issued and are safe to retry after caller correction. `Store` wraps any
/// lower-layer fault as-is; retry policy for those belongs to the store
/// client, not this layer.
#[derive(Error, Debug)]
pub enum VfsError {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("not a folder: {0}")]
    NotAFolder(String),

    #[error("not a file: {0}")]
    NotAFile(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for VfsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => VfsError::NotFound(key),
            other => VfsError::Store(other),
        }
    }
}
