//! # Library Catalog
//!
//! Facade over the workspace crates. Host applications depend on this crate
//! alone and get:
//!
//! - [`catalog`] - books, genres, authors, comments and the query/aggregation machinery
//! - [`runtime`] - configuration and logging
//! - [`bridge`] - the store contract the catalog is written against
//!
//! ```ignore
//! use library_catalog::{start, runtime::CatalogConfig};
//!
//! let service = start(&CatalogConfig::from_env()?).await?;
//! let books = service.list_books(Default::default()).await?;
//! ```

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

pub use bridge_traits as bridge;
pub use core_catalog as catalog;
pub use core_runtime as runtime;

pub use core_catalog::{
    Author, Book, BookFilter, BookListQuery, CatalogError, Genre, LibraryService,
    NewBookRequest, UpdateBookRequest,
};
pub use core_runtime::CatalogConfig;

use core_catalog::adapters::SqliteAdapter;
use core_catalog::db::DatabaseConfig;
use core_runtime::logging::{database_label, init_logging};

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error(transparent)]
    Runtime(#[from] core_runtime::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub type Result<T> = std::result::Result<T, BootstrapError>;

/// Open the configured store and build a service over it.
///
/// Leaves logging alone, so it can run under a subscriber the host installed.
pub async fn bootstrap(config: &CatalogConfig) -> Result<LibraryService> {
    config.validate()?;

    info!(
        database = %database_label(&config.database_url),
        max_connections = config.max_connections,
        "Opening library catalog"
    );

    let database = DatabaseConfig::from_url(config.database_url.clone())
        .max_connections(config.max_connections);
    let adapter = SqliteAdapter::connect(database).await?;

    Ok(LibraryService::new(Arc::new(adapter)))
}

/// Install the global subscriber described by `config`, then [`bootstrap`].
pub async fn start(config: &CatalogConfig) -> Result<LibraryService> {
    init_logging(config.logging())?;
    bootstrap(config).await
}
