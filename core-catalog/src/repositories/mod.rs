//! # Repositories
//!
//! Async data access over a shared [`DatabaseAdapter`]. Every repository has
//! a trait describing its operations and a SQLite implementation.
//!
//! - `BookRepository` - Book aggregates, read through one joined query
//! - `AuthorRepository` / `GenreRepository` - Shared reference entities
//! - `CommentRepository` - Reader comments per book
//! - `StatisticsRepository` - Book counts per author and genre
//!
//! Lookups return `Ok(None)` for absent rows; deciding whether that is an
//! error is left to the caller.

use bridge_traits::database::{DatabaseAdapter, QueryRow, QueryValue};

use crate::error::{CatalogError, Result};

pub mod author;
pub mod book;
pub mod comment;
pub mod genre;
pub mod statistics;

pub use author::{AuthorRepository, SqliteAuthorRepository};
pub use book::{BookRepository, SqliteBookRepository};
pub use comment::{CommentRepository, SqliteCommentRepository};
pub use genre::{GenreRepository, SqliteGenreRepository};
pub use statistics::{SqliteStatisticsRepository, StatisticsRepository};

/// Statements that run together in one adapter batch (one transaction).
#[derive(Debug, Default)]
pub(crate) struct StatementBatch {
    statements: Vec<(&'static str, Vec<QueryValue>)>,
}

impl StatementBatch {
    pub(crate) fn push(&mut self, statement: &'static str, params: Vec<QueryValue>) {
        self.statements.push((statement, params));
    }

    pub(crate) async fn run(self, adapter: &dyn DatabaseAdapter) -> Result<Vec<u64>> {
        let statements: Vec<(&str, &[QueryValue])> = self
            .statements
            .iter()
            .map(|(statement, params)| (*statement, params.as_slice()))
            .collect();
        Ok(adapter.execute_batch(&statements).await?)
    }
}

/// Integer column of an unlabelled single-value query such as `COUNT(*)`
pub(crate) fn scalar_i64(row: &QueryRow, column: &str) -> Result<i64> {
    row.get(column)
        .and_then(QueryValue::as_i64)
        .ok_or_else(|| CatalogError::Mapping {
            column: column.to_string(),
            row: 0,
            message: "missing integer column in result set".to_string(),
        })
}
