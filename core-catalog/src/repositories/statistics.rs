//! Book counts per author and per genre

use async_trait::async_trait;
use bridge_traits::database::DatabaseAdapter;
use std::sync::Arc;

use crate::error::Result;
use crate::mapping::{AuthorRowMapper, GenreRowMapper, IdentityTranslator, RowMapper, RowView};
use crate::models::{AuthorStatistic, GenreStatistic};

#[async_trait]
pub trait StatisticsRepository: Send + Sync {
    /// Every author with the number of books linked to them, by name
    async fn author_book_counts(&self) -> Result<Vec<AuthorStatistic>>;

    /// Every genre with the number of books filed under it, by name
    async fn genre_book_counts(&self) -> Result<Vec<GenreStatistic>>;
}

pub struct SqliteStatisticsRepository {
    adapter: Arc<dyn DatabaseAdapter>,
}

const AUTHOR_COUNTS: &str = r#"
    SELECT a.id AS "a.id", a.name AS "a.name", COUNT(ba.book_id) AS book_count
    FROM authors a
    LEFT JOIN books_authors ba ON ba.author_id = a.id
    GROUP BY a.id, a.name
    ORDER BY a.name
"#;

const GENRE_COUNTS: &str = r#"
    SELECT g.id AS "g.id", g.name AS "g.name", COUNT(bg.book_id) AS book_count
    FROM genres g
    LEFT JOIN books_genres bg ON bg.genre_id = g.id
    GROUP BY g.id, g.name
    ORDER BY g.name
"#;

impl SqliteStatisticsRepository {
    pub fn new(adapter: Arc<dyn DatabaseAdapter>) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl StatisticsRepository for SqliteStatisticsRepository {
    async fn author_book_counts(&self) -> Result<Vec<AuthorStatistic>> {
        let mapper = AuthorRowMapper::aliased("a");
        let rows = self.adapter.query(AUTHOR_COUNTS, &[]).await?;

        rows.iter()
            .enumerate()
            .map(|(index, row)| {
                // The count is the only unqualified column.
                let counts = RowView::new(row, index, &IdentityTranslator)?;
                Ok(AuthorStatistic {
                    author: mapper.map_row(row, index)?,
                    book_count: counts.i64("book_count")?,
                })
            })
            .collect()
    }

    async fn genre_book_counts(&self) -> Result<Vec<GenreStatistic>> {
        let mapper = GenreRowMapper::aliased("g");
        let rows = self.adapter.query(GENRE_COUNTS, &[]).await?;

        rows.iter()
            .enumerate()
            .map(|(index, row)| {
                let counts = RowView::new(row, index, &IdentityTranslator)?;
                Ok(GenreStatistic {
                    genre: mapper.map_row(row, index)?,
                    book_count: counts.i64("book_count")?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Book;
    use crate::repositories::test_support::test_adapter;
    use crate::repositories::{
        AuthorRepository, BookRepository, GenreRepository, SqliteAuthorRepository,
        SqliteBookRepository, SqliteGenreRepository,
    };

    #[tokio::test]
    async fn test_counts_include_unused_entities() {
        let adapter = test_adapter().await;
        let books = SqliteBookRepository::new(adapter.clone());
        let genres = SqliteGenreRepository::new(adapter.clone());
        let authors = SqliteAuthorRepository::new(adapter.clone());
        let stats = SqliteStatisticsRepository::new(adapter);

        let prose = genres.insert("Prose").await.unwrap();
        genres.insert("Opera").await.unwrap();
        let gogol = authors.insert("Gogol").await.unwrap();
        authors.insert("Anonymous").await.unwrap();

        for (isbn, title) in [("isbn-1", "The Overcoat"), ("isbn-2", "The Nose")] {
            let mut book = Book::new(isbn, title);
            book.add_genre(Arc::new(prose.clone()));
            book.add_author(Arc::new(gogol.clone()));
            books.insert(&book).await.unwrap();
        }

        let by_author = stats.author_book_counts().await.unwrap();
        let counts: Vec<(&str, i64)> = by_author
            .iter()
            .map(|s| (s.author.name.as_str(), s.book_count))
            .collect();
        assert_eq!(counts, vec![("Anonymous", 0), ("Gogol", 2)]);

        let by_genre = stats.genre_book_counts().await.unwrap();
        let counts: Vec<(&str, i64)> = by_genre
            .iter()
            .map(|s| (s.genre.name.as_str(), s.book_count))
            .collect();
        assert_eq!(counts, vec![("Opera", 0), ("Prose", 2)]);
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let stats = SqliteStatisticsRepository::new(test_adapter().await);
        assert!(stats.author_book_counts().await.unwrap().is_empty());
        assert!(stats.genre_book_counts().await.unwrap().is_empty());
    }
}
