//! Genre repository trait and implementation

use async_trait::async_trait;
use bridge_traits::database::{DatabaseAdapter, QueryValue};
use std::sync::Arc;
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::mapping::{GenreRowMapper, RowMapper};
use crate::models::{normalize_name, Genre, GenreId};
use crate::repositories::scalar_i64;
use crate::sql::schema::GENRES;
use crate::sql::{ParamStyle, SelectQueryBuilder};

/// Genre repository interface for data access operations
#[async_trait]
pub trait GenreRepository: Send + Sync {
    /// Find a genre by its ID
    ///
    /// # Returns
    /// - `Ok(Some(genre))` if found
    /// - `Ok(None)` if not found
    async fn find_by_id(&self, id: GenreId) -> Result<Option<Genre>>;

    /// Find a genre by name, ignoring case and surrounding whitespace
    async fn find_by_name(&self, name: &str) -> Result<Option<Genre>>;

    /// All genres ordered by name
    async fn find_all(&self) -> Result<Vec<Genre>>;

    /// Insert a new genre and return it with its assigned id
    ///
    /// # Errors
    /// Returns error if:
    /// - The name is blank
    /// - A genre with the same name already exists
    async fn insert(&self, name: &str) -> Result<Genre>;

    /// Return the genre called `name`, creating it when missing
    async fn find_or_create(&self, name: &str) -> Result<Genre>;
}

/// SQLite implementation of GenreRepository
pub struct SqliteGenreRepository {
    adapter: Arc<dyn DatabaseAdapter>,
    mapper: GenreRowMapper,
}

impl SqliteGenreRepository {
    pub fn new(adapter: Arc<dyn DatabaseAdapter>) -> Self {
        Self {
            adapter,
            mapper: GenreRowMapper::aliased("g"),
        }
    }

    fn select(filter_field: Option<&'static str>) -> Result<String> {
        SelectQueryBuilder::new(&GENRES)
            .use_alias("g")
            .use_filter_fields(filter_field)
            .order_by("name")
            .param_style(ParamStyle::Numbered)
            .build()
    }

    async fn fetch_optional(&self, sql: &str, params: &[QueryValue]) -> Result<Option<Genre>> {
        match self.adapter.query_one_optional(sql, params).await? {
            Some(row) => Ok(Some(self.mapper.map_row(&row, 0)?)),
            None => Ok(None),
        }
    }

    fn validated_name(name: &str) -> Result<String> {
        let name = normalize_name(name);
        if name.is_empty() {
            return Err(CatalogError::invalid_input(
                "Genre",
                "Genre name cannot be empty",
            ));
        }
        Ok(name)
    }
}

#[async_trait]
impl GenreRepository for SqliteGenreRepository {
    async fn find_by_id(&self, id: GenreId) -> Result<Option<Genre>> {
        let sql = Self::select(Some("id"))?;
        self.fetch_optional(&sql, &[QueryValue::Integer(id.0)])
            .await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Genre>> {
        let sql = Self::select(Some("name"))?;
        self.fetch_optional(&sql, &[QueryValue::Text(normalize_name(name))])
            .await
    }

    async fn find_all(&self) -> Result<Vec<Genre>> {
        let sql = Self::select(None)?;
        let rows = self.adapter.query(&sql, &[]).await?;
        rows.iter()
            .enumerate()
            .map(|(index, row)| self.mapper.map_row(row, index))
            .collect()
    }

    async fn insert(&self, name: &str) -> Result<Genre> {
        let name = Self::validated_name(name)?;
        let row = self
            .adapter
            .query_one(
                "INSERT INTO genres (name) VALUES (?1) RETURNING id",
                &[QueryValue::Text(name.clone())],
            )
            .await?;
        let genre = Genre::new(GenreId(scalar_i64(&row, "id")?), name);
        debug!(genre_id = %genre.id, name = %genre.name, "Inserted genre");
        Ok(genre)
    }

    async fn find_or_create(&self, name: &str) -> Result<Genre> {
        let name = Self::validated_name(name)?;
        self.adapter
            .execute(
                "INSERT INTO genres (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
                &[QueryValue::Text(name.clone())],
            )
            .await?;
        self.find_by_name(&name)
            .await?
            .ok_or_else(|| CatalogError::not_found("Genre", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::test_adapter;

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = SqliteGenreRepository::new(test_adapter().await);

        let genre = repo.insert("  Satire ").await.unwrap();
        assert_eq!(genre.name, "Satire");
        assert!(genre.id.is_saved());

        let found = repo.find_by_id(genre.id).await.unwrap();
        assert_eq!(found, Some(genre.clone()));

        let by_name = repo.find_by_name("satire").await.unwrap();
        assert_eq!(by_name, Some(genre));

        assert!(repo.find_by_id(GenreId(999)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_blank_and_duplicates() {
        let repo = SqliteGenreRepository::new(test_adapter().await);

        assert!(matches!(
            repo.insert("   ").await,
            Err(CatalogError::InvalidInput { .. })
        ));

        repo.insert("Drama").await.unwrap();
        assert!(repo.insert("DRAMA").await.is_err());
    }

    #[tokio::test]
    async fn test_find_or_create() {
        let repo = SqliteGenreRepository::new(test_adapter().await);

        let created = repo.find_or_create("Poetry").await.unwrap();
        let again = repo.find_or_create("poetry").await.unwrap();
        assert_eq!(created.id, again.id);

        let all = repo.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_find_all_ordered_by_name() {
        let repo = SqliteGenreRepository::new(test_adapter().await);
        repo.insert("Tragedy").await.unwrap();
        repo.insert("Comedy").await.unwrap();

        let names: Vec<String> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|genre| genre.name)
            .collect();
        assert_eq!(names, vec!["Comedy", "Tragedy"]);
    }
}
