//! Book repository trait and implementation
//!
//! Books are always read as aggregates: one query joins books to their genres
//! and authors, and [`AggregatingResultSetReader`] folds the rows back into
//! `Book` values.

use async_trait::async_trait;
use bridge_traits::database::{DatabaseAdapter, QueryValue};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{CatalogError, Result};
use crate::mapping::{AuthorRowMapper, BookRowMapper, GenreRowMapper};
use crate::models::{AuthorId, Book, BookId, GenreId};
use crate::query::BookFilter;
use crate::reader::AggregatingResultSetReader;
use crate::repositories::{scalar_i64, StatementBatch};
use crate::sql::{ParamStyle, SelectQueryBuilder, BOOKS, BOOK_AUTHORS_JOIN, BOOK_GENRES_JOIN};

/// Book repository interface for data access operations
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Find a book with its genres and authors
    ///
    /// # Returns
    /// - `Ok(Some(book))` if found
    /// - `Ok(None)` if not found
    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>>;

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>>;

    /// All books ordered by id
    async fn find_all(&self) -> Result<Vec<Book>>;

    /// Books written by `author_id`, each with its complete author set
    async fn find_by_author(&self, author_id: AuthorId) -> Result<Vec<Book>>;

    /// Books filed under `genre_id`, each with its complete genre set
    async fn find_by_genre(&self, genre_id: GenreId) -> Result<Vec<Book>>;

    /// Books matching every present field of `filter`
    async fn find(&self, filter: &BookFilter) -> Result<Vec<Book>>;

    /// Insert a book with its genre and author links
    ///
    /// # Returns
    /// The id assigned to the new book
    ///
    /// # Errors
    /// Returns error if:
    /// - Book validation fails
    /// - The ISBN is already taken
    /// - A linked genre or author does not exist
    async fn insert(&self, book: &Book) -> Result<BookId>;

    /// Overwrite a book's fields and replace its genre and author links
    ///
    /// # Errors
    /// Returns `CatalogError::NotFound` if no book has `book.id`.
    async fn update(&self, book: &Book) -> Result<()>;

    /// Delete a book, its links and its comments
    ///
    /// # Returns
    /// - `Ok(true)` if the book was deleted
    /// - `Ok(false)` if it was not found
    async fn delete(&self, id: BookId) -> Result<bool>;

    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of BookRepository
pub struct SqliteBookRepository {
    adapter: Arc<dyn DatabaseAdapter>,
    books: BookRowMapper,
    genres: GenreRowMapper,
    authors: AuthorRowMapper,
}

impl SqliteBookRepository {
    pub fn new(adapter: Arc<dyn DatabaseAdapter>) -> Self {
        Self {
            adapter,
            books: BookRowMapper::aliased("b"),
            genres: GenreRowMapper::aliased("g"),
            authors: AuthorRowMapper::aliased("a"),
        }
    }

    fn validate_book(book: &Book) -> Result<()> {
        book.validate()
            .map_err(|msg| CatalogError::invalid_input("Book", msg))
    }

    /// Run the joined book query for `filter` and aggregate its rows.
    async fn select(
        &self,
        filter: &BookFilter,
        limit: Option<u64>,
    ) -> Result<BTreeMap<BookId, Book>> {
        let fields = filter.fields();

        let mut builder = SelectQueryBuilder::new(&BOOKS)
            .use_alias("b")
            .join(BOOK_GENRES_JOIN)
            .join(BOOK_AUTHORS_JOIN)
            .project("g", &["id", "name"])
            .project("a", &["id", "name"])
            .use_filter_fields(fields.iter().map(|(field, _)| *field))
            .param_style(ParamStyle::Numbered);
        if let Some(limit) = limit {
            builder = builder.limit(limit);
        }
        let sql = builder.build()?;

        let params: Vec<QueryValue> = fields.into_iter().map(|(_, value)| value).collect();
        let mut rows = self.adapter.query_rows(&sql, &params).await?;

        let books = AggregatingResultSetReader::aggregate(
            &mut rows,
            &self.books,
            &self.genres,
            &self.authors,
        )?;
        debug!(count = books.len(), "Loaded books");
        Ok(books)
    }

    async fn select_one(&self, filter: &BookFilter) -> Result<Option<Book>> {
        Ok(self.select(filter, Some(1)).await?.into_values().next())
    }

    async fn select_all(&self, filter: &BookFilter) -> Result<Vec<Book>> {
        Ok(self.select(filter, None).await?.into_values().collect())
    }

    fn push_links(batch: &mut StatementBatch, book: &Book, book_ref: QueryValue) {
        for genre_id in book.genre_ids() {
            batch.push(
                "INSERT INTO books_genres (book_id, genre_id) \
                 SELECT id, ?2 FROM books WHERE isbn = ?1",
                vec![book_ref.clone(), QueryValue::Integer(genre_id.0)],
            );
        }
        for author_id in book.author_ids() {
            batch.push(
                "INSERT INTO books_authors (book_id, author_id) \
                 SELECT id, ?2 FROM books WHERE isbn = ?1",
                vec![book_ref.clone(), QueryValue::Integer(author_id.0)],
            );
        }
    }
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>> {
        self.select_one(&BookFilter::by_id(id)).await
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        self.select_one(&BookFilter::by_isbn(isbn)).await
    }

    async fn find_all(&self) -> Result<Vec<Book>> {
        self.select_all(&BookFilter::default()).await
    }

    async fn find_by_author(&self, author_id: AuthorId) -> Result<Vec<Book>> {
        self.select_all(&BookFilter::by_author(author_id)).await
    }

    async fn find_by_genre(&self, genre_id: GenreId) -> Result<Vec<Book>> {
        self.select_all(&BookFilter::by_genre(genre_id)).await
    }

    async fn find(&self, filter: &BookFilter) -> Result<Vec<Book>> {
        self.select_all(filter).await
    }

    async fn insert(&self, book: &Book) -> Result<BookId> {
        Self::validate_book(book)?;

        // Links resolve the new id through the ISBN so the whole insert is
        // one batch.
        let mut batch = StatementBatch::default();
        batch.push(
            "INSERT INTO books (isbn, title) VALUES (?1, ?2)",
            vec![
                QueryValue::Text(book.isbn.clone()),
                QueryValue::Text(book.title.clone()),
            ],
        );
        Self::push_links(&mut batch, book, QueryValue::Text(book.isbn.clone()));
        batch.run(self.adapter.as_ref()).await?;

        let row = self
            .adapter
            .query_one(
                "SELECT id FROM books WHERE isbn = ?1",
                &[QueryValue::Text(book.isbn.clone())],
            )
            .await?;
        let id = BookId(scalar_i64(&row, "id")?);

        info!(book_id = %id, isbn = %book.isbn, "Inserted book");
        Ok(id)
    }

    async fn update(&self, book: &Book) -> Result<()> {
        Self::validate_book(book)?;

        let exists = self
            .adapter
            .query_one_optional(
                "SELECT id FROM books WHERE id = ?1",
                &[QueryValue::Integer(book.id.0)],
            )
            .await?
            .is_some();
        if !exists {
            return Err(CatalogError::not_found("Book", book.id));
        }

        let id = QueryValue::Integer(book.id.0);
        let mut batch = StatementBatch::default();
        batch.push(
            "UPDATE books SET isbn = ?1, title = ?2 WHERE id = ?3",
            vec![
                QueryValue::Text(book.isbn.clone()),
                QueryValue::Text(book.title.clone()),
                id.clone(),
            ],
        );
        batch.push(
            "DELETE FROM books_genres WHERE book_id = ?1",
            vec![id.clone()],
        );
        batch.push("DELETE FROM books_authors WHERE book_id = ?1", vec![id]);
        Self::push_links(&mut batch, book, QueryValue::Text(book.isbn.clone()));
        batch.run(self.adapter.as_ref()).await?;

        info!(book_id = %book.id, "Updated book");
        Ok(())
    }

    async fn delete(&self, id: BookId) -> Result<bool> {
        let affected = self
            .adapter
            .execute(
                "DELETE FROM books WHERE id = ?1",
                &[QueryValue::Integer(id.0)],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn count(&self) -> Result<i64> {
        let row = self
            .adapter
            .query_one("SELECT COUNT(*) AS count FROM books", &[])
            .await?;
        scalar_i64(&row, "count")
    }
}
