//! Native SQLite Database Adapter
//!
//! Implements the `DatabaseAdapter` trait over a `sqlx` SQLite pool. Column
//! labels are passed through untouched, so a joined query that selects
//! `b.id AS "b.id"` yields rows keyed by `"b.id"`.

use async_trait::async_trait;
use bridge_traits::database::{DatabaseAdapter, QueryRow, QueryValue};
use bridge_traits::error::{BridgeError, Result};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Pool, Row, Sqlite};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::db::{create_pool, DatabaseConfig};

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Native SQLite implementation of DatabaseAdapter
#[derive(Clone)]
pub struct SqliteAdapter {
    pool: Pool<Sqlite>,
}

impl SqliteAdapter {
    /// Open a pool for `config` (migrations applied) and wrap it
    pub async fn connect(config: DatabaseConfig) -> crate::Result<Self> {
        let pool = create_pool(config).await?;
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    fn row_to_query_row(row: &SqliteRow) -> QueryRow {
        let mut result = HashMap::new();

        for column in row.columns() {
            let column_name = column.name().to_string();

            let value = if let Ok(v) = row.try_get::<Option<i64>, _>(column.ordinal()) {
                v.map(QueryValue::Integer).unwrap_or(QueryValue::Null)
            } else if let Ok(v) = row.try_get::<Option<f64>, _>(column.ordinal()) {
                v.map(QueryValue::Real).unwrap_or(QueryValue::Null)
            } else if let Ok(v) = row.try_get::<Option<String>, _>(column.ordinal()) {
                v.map(QueryValue::Text).unwrap_or(QueryValue::Null)
            } else if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(column.ordinal()) {
                v.map(QueryValue::Blob).unwrap_or(QueryValue::Null)
            } else {
                QueryValue::Null
            };

            result.insert(column_name, value);
        }

        result
    }

    fn bind_params<'q>(query: SqliteQuery<'q>, params: &'q [QueryValue]) -> SqliteQuery<'q> {
        let mut query = query;
        for param in params {
            query = match param {
                QueryValue::Null => query.bind(None::<i64>),
                QueryValue::Integer(i) => query.bind(i),
                QueryValue::Real(r) => query.bind(r),
                QueryValue::Text(s) => query.bind(s.as_str()),
                QueryValue::Blob(b) => query.bind(b.as_slice()),
            };
        }
        query
    }
}

#[async_trait]
impl DatabaseAdapter for SqliteAdapter {
    async fn initialize(&mut self) -> Result<()> {
        debug!("Initializing database adapter");

        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Migration failed");
                BridgeError::DatabaseError(format!("Migration failed: {}", e))
            })?;

        self.health_check().await?;

        info!("Database adapter initialized successfully");
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Database health check failed");
                BridgeError::DatabaseError(format!("Health check failed: {}", e))
            })?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        info!("Closing database connection pool");
        self.pool.close().await;
        Ok(())
    }

    async fn query(&self, query: &str, params: &[QueryValue]) -> Result<Vec<QueryRow>> {
        debug!(query = %query, param_count = params.len(), "Executing query");

        let rows = Self::bind_params(sqlx::query(query), params)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Query failed: {}", e)))?;

        let result: Vec<QueryRow> = rows.iter().map(Self::row_to_query_row).collect();

        debug!(row_count = result.len(), "Query executed successfully");
        Ok(result)
    }

    async fn execute(&self, statement: &str, params: &[QueryValue]) -> Result<u64> {
        debug!(statement = %statement, param_count = params.len(), "Executing statement");

        let result = Self::bind_params(sqlx::query(statement), params)
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Execute failed: {}", e)))?;

        Ok(result.rows_affected())
    }

    async fn query_one_optional(
        &self,
        query: &str,
        params: &[QueryValue],
    ) -> Result<Option<QueryRow>> {
        debug!(query = %query, param_count = params.len(), "Executing query_one_optional");

        let row = Self::bind_params(sqlx::query(query), params)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Query one optional failed: {}", e)))?;

        Ok(row.as_ref().map(Self::row_to_query_row))
    }

    async fn query_one(&self, query: &str, params: &[QueryValue]) -> Result<QueryRow> {
        debug!(query = %query, param_count = params.len(), "Executing query_one");

        let row = Self::bind_params(sqlx::query(query), params)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Query one failed: {}", e)))?;

        Ok(Self::row_to_query_row(&row))
    }

    /// Runs every statement on one connection inside a transaction; the batch
    /// is rolled back if any statement fails.
    async fn execute_batch(&self, statements: &[(&str, &[QueryValue])]) -> Result<Vec<u64>> {
        debug!(batch_size = statements.len(), "Executing batch");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Begin transaction failed: {}", e)))?;

        let mut results = Vec::with_capacity(statements.len());
        for (statement, params) in statements {
            let result = Self::bind_params(sqlx::query(statement), params)
                .execute(&mut *tx)
                .await
                .map_err(|e| BridgeError::DatabaseError(format!("Batch statement failed: {}", e)))?;
            results.push(result.rows_affected());
        }

        tx.commit()
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Commit failed: {}", e)))?;

        debug!(results = ?results, "Batch executed successfully");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use bridge_traits::database::RowStream;

    async fn create_test_adapter() -> SqliteAdapter {
        SqliteAdapter::from_pool(create_test_pool().await.unwrap())
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let mut adapter = create_test_adapter().await;
        assert!(adapter.initialize().await.is_ok());
        assert!(adapter.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_query_keeps_labelled_columns() {
        let adapter = create_test_adapter().await;
        let rows = adapter
            .query(
                "SELECT 1 AS \"b.id\", 'Poems' AS \"b.title\", NULL AS \"g.id\", 2.5 AS score",
                &[],
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("b.id"), Some(&QueryValue::Integer(1)));
        assert_eq!(rows[0].get("b.title"), Some(&QueryValue::Text("Poems".into())));
        assert_eq!(rows[0].get("g.id"), Some(&QueryValue::Null));
        assert_eq!(rows[0].get("score"), Some(&QueryValue::Real(2.5)));
    }

    #[tokio::test]
    async fn test_numbered_params() {
        let adapter = create_test_adapter().await;
        let params = [QueryValue::Integer(4), QueryValue::Text("x".into())];
        let row = adapter
            .query_one("SELECT ?2 AS second, ?1 AS first", &params)
            .await
            .unwrap();

        assert_eq!(row.get("first"), Some(&QueryValue::Integer(4)));
        assert_eq!(row.get("second"), Some(&QueryValue::Text("x".into())));
    }

    #[tokio::test]
    async fn test_execute_and_query_rows() {
        let adapter = create_test_adapter().await;
        let inserted = adapter
            .execute(
                "INSERT INTO genres (name) VALUES (?1)",
                &[QueryValue::Text("Drama".into())],
            )
            .await
            .unwrap();
        assert_eq!(inserted, 1);

        let mut rows = adapter
            .query_rows("SELECT id, name FROM genres", &[])
            .await
            .unwrap();
        let row = rows.next_row().unwrap().unwrap();
        assert_eq!(row.get("name"), Some(&QueryValue::Text("Drama".into())));
        assert!(rows.next_row().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_batch_rolls_back_on_failure() {
        let adapter = create_test_adapter().await;
        let first = [QueryValue::Text("Poetry".into())];
        let duplicate = [QueryValue::Text("Poetry".into())];

        let statements: Vec<(&str, &[QueryValue])> = vec![
            ("INSERT INTO genres (name) VALUES (?1)", &first[..]),
            ("INSERT INTO genres (name) VALUES (?1)", &duplicate[..]),
        ];
        assert!(adapter.execute_batch(&statements).await.is_err());

        let rows = adapter.query("SELECT * FROM genres", &[]).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_batch_execute() {
        let adapter = create_test_adapter().await;
        let a = [QueryValue::Text("A".into())];
        let b = [QueryValue::Text("B".into())];

        let statements: Vec<(&str, &[QueryValue])> = vec![
            ("INSERT INTO authors (name) VALUES (?1)", &a[..]),
            ("INSERT INTO authors (name) VALUES (?1)", &b[..]),
        ];
        let results = adapter.execute_batch(&statements).await.unwrap();
        assert_eq!(results, vec![1, 1]);
    }
}
