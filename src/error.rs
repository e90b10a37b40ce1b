use thiserror::Error;

/// Failures reported by a [`crate::storage::StorageClient`].
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("document update conflict: {0}")]
    Conflict(String),

    #[error("view not found: {0}")]
    MissingView(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("storage backend error: {0}")]
    Backend(#[from] opendal::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures surfaced by the note access layer.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict while writing `{id}`")]
    Conflict { id: String },

    #[error("configuration error: {0}")]
    Config(anyhow::Error),

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for ClientError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict(id) => ClientError::Conflict { id },
            StorageError::NotFound(id) => {
                ClientError::NotFound(format!("The document `{}` does not exist", id))
            }
            other => ClientError::Storage(other),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Storage(StorageError::Serialization(err))
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
pub type ClientResult<T> = Result<T, ClientError>;
