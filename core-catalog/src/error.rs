use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Query configuration error: {0}")]
    Configuration(String),

    #[error("Row mapping failed at row {row}, column {column}: {message}")]
    Mapping {
        column: String,
        row: usize,
        message: String,
    },

    #[error("Column '{column}' does not start with prefix '{prefix}'")]
    Translation { column: String, prefix: String },

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("Migration failed: {0}")]
    Migration(String),
}

impl CatalogError {
    pub(crate) fn not_found(entity_type: &str, id: impl ToString) -> Self {
        CatalogError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    pub(crate) fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        CatalogError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
