//! Author repository trait and implementation

use async_trait::async_trait;
use bridge_traits::database::{DatabaseAdapter, QueryValue};
use std::sync::Arc;
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::mapping::{AuthorRowMapper, RowMapper};
use crate::models::{normalize_name, Author, AuthorId};
use crate::repositories::scalar_i64;
use crate::sql::schema::AUTHORS;
use crate::sql::{ParamStyle, SelectQueryBuilder};

/// Author repository interface for data access operations
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Find an author by its ID
    ///
    /// # Returns
    /// - `Ok(Some(author))` if found
    /// - `Ok(None)` if not found
    async fn find_by_id(&self, id: AuthorId) -> Result<Option<Author>>;

    /// Find an author by name, ignoring case and surrounding whitespace
    async fn find_by_name(&self, name: &str) -> Result<Option<Author>>;

    /// All authors ordered by name
    async fn find_all(&self) -> Result<Vec<Author>>;

    /// Insert a new author and return it with its assigned id
    ///
    /// # Errors
    /// Returns error if:
    /// - The name is blank
    /// - An author with the same name already exists
    async fn insert(&self, name: &str) -> Result<Author>;

    /// Return the author called `name`, creating it when missing
    async fn find_or_create(&self, name: &str) -> Result<Author>;
}

/// SQLite implementation of AuthorRepository
pub struct SqliteAuthorRepository {
    adapter: Arc<dyn DatabaseAdapter>,
    mapper: AuthorRowMapper,
}

impl SqliteAuthorRepository {
    pub fn new(adapter: Arc<dyn DatabaseAdapter>) -> Self {
        Self {
            adapter,
            mapper: AuthorRowMapper::aliased("a"),
        }
    }

    fn select(filter_field: Option<&'static str>) -> Result<String> {
        SelectQueryBuilder::new(&AUTHORS)
            .use_alias("a")
            .use_filter_fields(filter_field)
            .order_by("name")
            .param_style(ParamStyle::Numbered)
            .build()
    }

    async fn fetch_optional(&self, sql: &str, params: &[QueryValue]) -> Result<Option<Author>> {
        match self.adapter.query_one_optional(sql, params).await? {
            Some(row) => Ok(Some(self.mapper.map_row(&row, 0)?)),
            None => Ok(None),
        }
    }

    fn validated_name(name: &str) -> Result<String> {
        let name = normalize_name(name);
        if name.is_empty() {
            return Err(CatalogError::invalid_input(
                "Author",
                "Author name cannot be empty",
            ));
        }
        Ok(name)
    }
}

#[async_trait]
impl AuthorRepository for SqliteAuthorRepository {
    async fn find_by_id(&self, id: AuthorId) -> Result<Option<Author>> {
        let sql = Self::select(Some("id"))?;
        self.fetch_optional(&sql, &[QueryValue::Integer(id.0)])
            .await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Author>> {
        let sql = Self::select(Some("name"))?;
        self.fetch_optional(&sql, &[QueryValue::Text(normalize_name(name))])
            .await
    }

    async fn find_all(&self) -> Result<Vec<Author>> {
        let sql = Self::select(None)?;
        let rows = self.adapter.query(&sql, &[]).await?;
        rows.iter()
            .enumerate()
            .map(|(index, row)| self.mapper.map_row(row, index))
            .collect()
    }

    async fn insert(&self, name: &str) -> Result<Author> {
        let name = Self::validated_name(name)?;
        let row = self
            .adapter
            .query_one(
                "INSERT INTO authors (name) VALUES (?1) RETURNING id",
                &[QueryValue::Text(name.clone())],
            )
            .await?;
        let author = Author::new(AuthorId(scalar_i64(&row, "id")?), name);
        debug!(author_id = %author.id, name = %author.name, "Inserted author");
        Ok(author)
    }

    async fn find_or_create(&self, name: &str) -> Result<Author> {
        let name = Self::validated_name(name)?;
        self.adapter
            .execute(
                "INSERT INTO authors (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
                &[QueryValue::Text(name.clone())],
            )
            .await?;
        self.find_by_name(&name)
            .await?
            .ok_or_else(|| CatalogError::not_found("Author", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::test_adapter;

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = SqliteAuthorRepository::new(test_adapter().await);

        let author = repo.insert("  Gogol ").await.unwrap();
        assert_eq!(author.name, "Gogol");
        assert!(author.id.is_saved());

        let found = repo.find_by_id(author.id).await.unwrap();
        assert_eq!(found, Some(author.clone()));

        let by_name = repo.find_by_name("gogol").await.unwrap();
        assert_eq!(by_name, Some(author));

        assert!(repo.find_by_id(AuthorId(999)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_blank_and_duplicates() {
        let repo = SqliteAuthorRepository::new(test_adapter().await);

        assert!(matches!(
            repo.insert("   ").await,
            Err(CatalogError::InvalidInput { .. })
        ));

        repo.insert("Chekhov").await.unwrap();
        assert!(repo.insert("CHEKHOV").await.is_err());
    }

    #[tokio::test]
    async fn test_find_or_create() {
        let repo = SqliteAuthorRepository::new(test_adapter().await);

        let created = repo.find_or_create("Pushkin").await.unwrap();
        let again = repo.find_or_create("pushkin").await.unwrap();
        assert_eq!(created.id, again.id);

        let all = repo.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_find_all_ordered_by_name() {
        let repo = SqliteAuthorRepository::new(test_adapter().await);
        repo.insert("Tolstoy").await.unwrap();
        repo.insert("Bulgakov").await.unwrap();

        let names: Vec<String> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|author| author.name)
            .collect();
        assert_eq!(names, vec!["Bulgakov", "Tolstoy"]);
    }
}
