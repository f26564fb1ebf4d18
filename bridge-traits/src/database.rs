//! Database Abstraction Layer
//!
//! Provides the store-facing contract used by the catalog core:
//! - Native: SQLite via sqlx (`core_catalog::adapters::SqliteAdapter`)
//! - Tests: in-memory row vectors or fake adapters
//!
//! ## Design Philosophy
//!
//! Rows travel as plain maps of column name to [`QueryValue`]. Joined queries
//! label their columns with the table alias (`"b.id"`, `"g.name"`), which is
//! what lets a single flattened result set carry several entities at once.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_traits::database::{DatabaseAdapter, QueryValue, RowStream};
//!
//! let mut rows = adapter
//!     .query_rows("SELECT id, name FROM genres WHERE id = ?", &[QueryValue::Integer(3)])
//!     .await?;
//! while let Some(row) = rows.next_row()? {
//!     // ...
//! }
//! rows.close();
//! ```

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::{BridgeError, Result};

// =============================================================================
// Query Result Types
// =============================================================================

/// Represents a single row from a database query as a map of column names to values
pub type QueryRow = std::collections::HashMap<String, QueryValue>;

/// Represents a database value that can be null, integer, real, text, or blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl QueryValue {
    /// Convert to i64 if possible
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            QueryValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Convert to f64 if possible
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            QueryValue::Real(r) => Some(*r),
            QueryValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Convert to String if possible
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Convert to String (owned) if possible
    pub fn as_string(&self) -> Option<String> {
        self.as_str().map(str::to_owned)
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, QueryValue::Null)
    }

    /// Short name of the stored type, used in mapping diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            QueryValue::Null => "null",
            QueryValue::Integer(_) => "integer",
            QueryValue::Real(_) => "real",
            QueryValue::Text(_) => "text",
            QueryValue::Blob(_) => "blob",
        }
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Integer(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl<T> From<Option<T>> for QueryValue
where
    T: Into<QueryValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(QueryValue::Null)
    }
}

// =============================================================================
// Row Streams
// =============================================================================

/// Forward-only cursor over the rows of one result set.
///
/// A stream is a scoped resource: the consumer acquires it right before reading
/// and must call [`close`](RowStream::close) once it is done, whether the read
/// finished or failed. Reading from a closed stream yields
/// [`BridgeError::StreamClosed`].
pub trait RowStream {
    /// Advance the cursor and return the next row, or `None` once exhausted.
    fn next_row(&mut self) -> Result<Option<QueryRow>>;

    /// Release the underlying result set. Calling it twice is a no-op.
    fn close(&mut self);

    /// Whether [`close`](RowStream::close) has been called.
    fn is_closed(&self) -> bool;
}

/// Row stream over an already fetched result set.
#[derive(Debug, Default)]
pub struct QueryRows {
    rows: VecDeque<QueryRow>,
    closed: bool,
}

impl QueryRows {
    pub fn new(rows: Vec<QueryRow>) -> Self {
        Self {
            rows: rows.into(),
            closed: false,
        }
    }

    /// Rows not consumed yet
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl From<Vec<QueryRow>> for QueryRows {
    fn from(rows: Vec<QueryRow>) -> Self {
        Self::new(rows)
    }
}

impl RowStream for QueryRows {
    fn next_row(&mut self) -> Result<Option<QueryRow>> {
        if self.closed {
            return Err(BridgeError::StreamClosed);
        }
        Ok(self.rows.pop_front())
    }

    fn close(&mut self) {
        self.closed = true;
        self.rows.clear();
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

// =============================================================================
// Database Adapter Trait
// =============================================================================

/// Database adapter trait for async store access
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync`; repositories share one adapter
/// through an `Arc<dyn DatabaseAdapter>`.
///
/// ## Parameters
///
/// Parameters are bound positionally. Statements may use `?` or numbered
/// `?NNN` placeholders; the n-th numbered placeholder binds `params[n - 1]`.
#[async_trait::async_trait]
pub trait DatabaseAdapter: Send + Sync {
    // =========================================================================
    // Connection Management
    // =========================================================================

    /// Initialize the store: run migrations and perform a health check
    async fn initialize(&mut self) -> Result<()>;

    /// Check if the database connection is healthy
    async fn health_check(&self) -> Result<()>;

    /// Close all database connections
    async fn close(&mut self) -> Result<()>;

    // =========================================================================
    // Raw Query Execution
    // =========================================================================

    /// Execute a raw SQL query and return rows
    ///
    /// # Safety
    ///
    /// This method should use parameterized queries to prevent SQL injection.
    /// Never concatenate user input directly into the query string.
    async fn query(&self, query: &str, params: &[QueryValue]) -> Result<Vec<QueryRow>>;

    /// Execute a SQL statement that doesn't return rows (INSERT, UPDATE, DELETE)
    ///
    /// # Returns
    ///
    /// Number of rows affected
    async fn execute(&self, statement: &str, params: &[QueryValue]) -> Result<u64>;

    /// Execute a query and return a single optional row
    async fn query_one_optional(
        &self,
        query: &str,
        params: &[QueryValue],
    ) -> Result<Option<QueryRow>>;

    /// Execute a query and return exactly one row
    ///
    /// Returns an error if no rows are returned.
    async fn query_one(&self, query: &str, params: &[QueryValue]) -> Result<QueryRow>;

    /// Execute multiple statements in order, returning the row count of each
    async fn execute_batch(&self, statements: &[(&str, &[QueryValue])]) -> Result<Vec<u64>>;

    /// Execute a query and hand its rows back as a [`RowStream`]
    async fn query_rows(&self, query: &str, params: &[QueryValue]) -> Result<QueryRows> {
        let rows = self.query(query, params).await?;
        Ok(QueryRows::new(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64) -> QueryRow {
        let mut row = QueryRow::new();
        row.insert("id".to_string(), QueryValue::Integer(id));
        row
    }

    #[test]
    fn test_query_value_conversions() {
        let int_val = QueryValue::Integer(42);
        assert_eq!(int_val.as_i64(), Some(42));
        assert_eq!(int_val.as_f64(), Some(42.0));
        assert!(int_val.as_str().is_none());

        let text_val = QueryValue::Text("hello".to_string());
        assert_eq!(text_val.as_str(), Some("hello"));
        assert_eq!(text_val.as_string(), Some("hello".to_string()));
        assert!(text_val.as_i64().is_none());

        let null_val = QueryValue::Null;
        assert!(null_val.is_null());
        assert!(null_val.as_i64().is_none());
        assert_eq!(null_val.type_name(), "null");
    }

    #[test]
    fn test_query_value_from() {
        assert_eq!(QueryValue::from(7), QueryValue::Integer(7));
        assert_eq!(QueryValue::from("isbn"), QueryValue::Text("isbn".into()));
        assert_eq!(QueryValue::from(None::<i64>), QueryValue::Null);
        assert_eq!(QueryValue::from(Some("x")), QueryValue::Text("x".into()));
    }

    #[test]
    fn test_query_rows_reads_in_order() {
        let mut rows = QueryRows::new(vec![row(1), row(2)]);
        assert_eq!(rows.remaining(), 2);

        let first = rows.next_row().unwrap().unwrap();
        assert_eq!(first.get("id").and_then(QueryValue::as_i64), Some(1));
        let second = rows.next_row().unwrap().unwrap();
        assert_eq!(second.get("id").and_then(QueryValue::as_i64), Some(2));
        assert!(rows.next_row().unwrap().is_none());
    }

    #[test]
    fn test_query_rows_closed() {
        let mut rows = QueryRows::new(vec![row(1)]);
        rows.close();
        rows.close();
        assert!(rows.is_closed());
        assert!(matches!(rows.next_row(), Err(BridgeError::StreamClosed)));
    }

    /// Adapter that answers every query with a fixed row set.
    struct FixedRowsAdapter {
        rows: Vec<QueryRow>,
    }

    #[async_trait::async_trait]
    impl DatabaseAdapter for FixedRowsAdapter {
        async fn initialize(&mut self) -> Result<()> {
            Ok(())
        }

        async fn health_check(&self) -> Result<()> {
            Ok(())
        }

        async fn close(&mut self) -> Result<()> {
            Ok(())
        }

        async fn query(&self, _query: &str, _params: &[QueryValue]) -> Result<Vec<QueryRow>> {
            Ok(self.rows.clone())
        }

        async fn execute(&self, _statement: &str, _params: &[QueryValue]) -> Result<u64> {
            Ok(0)
        }

        async fn query_one_optional(
            &self,
            _query: &str,
            _params: &[QueryValue],
        ) -> Result<Option<QueryRow>> {
            Ok(self.rows.first().cloned())
        }

        async fn query_one(&self, query: &str, params: &[QueryValue]) -> Result<QueryRow> {
            self.query_one_optional(query, params)
                .await?
                .ok_or_else(|| BridgeError::DatabaseError("no rows".to_string()))
        }

        async fn execute_batch(&self, statements: &[(&str, &[QueryValue])]) -> Result<Vec<u64>> {
            Ok(vec![0; statements.len()])
        }
    }

    #[tokio::test]
    async fn test_query_rows_wraps_query() {
        let adapter = FixedRowsAdapter {
            rows: vec![row(5)],
        };

        let mut rows = adapter.query_rows("SELECT id FROM books", &[]).await.unwrap();
        let first = rows.next_row().unwrap().unwrap();
        assert_eq!(first.get("id"), Some(&QueryValue::Integer(5)));
        assert!(rows.next_row().unwrap().is_none());
    }
}
