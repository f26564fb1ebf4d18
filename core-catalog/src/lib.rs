//! # Catalog Module
//!
//! Owns the library catalog: books, their genres and authors, reader comments
//! and per-author / per-genre statistics.
//!
//! ## Overview
//!
//! - `sql` builds the joined `SELECT` for books from a table schema, an alias,
//!   join clauses and a list of filter fields
//! - `mapping` turns one flattened row into one entity through per-entity row
//!   mappers and column name translators
//! - `reader` folds the book × genre × author rows back into `Book` aggregates
//! - `repositories` and `service` put the above to work over SQLite

pub mod adapters;
pub mod db;
pub mod error;
pub mod mapping;
pub mod models;
pub mod query;
pub mod reader;
pub mod repositories;
pub mod service;
pub mod sql;

pub use error::{CatalogError, Result};
pub use models::{Author, AuthorId, Book, BookId, Comment, CommentId, Genre, GenreId};
pub use query::BookFilter;
pub use reader::AggregatingResultSetReader;
pub use service::{BookListQuery, LibraryService, NewBookRequest, UpdateBookRequest};
