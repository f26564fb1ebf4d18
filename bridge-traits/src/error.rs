use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Row stream already closed")]
    StreamClosed,
}

pub type Result<T> = std::result::Result<T, BridgeError>;
