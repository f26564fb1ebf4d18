//! Library service façade.
//!
//! Validates typed requests, resolves genre and author names to stored
//! entities and turns absent rows into `NotFound` errors. All persistence goes
//! through the repositories.

use bridge_traits::database::DatabaseAdapter;
use bridge_traits::time::{Clock, SystemClock};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{CatalogError, Result};
use crate::models::{
    Author, AuthorId, AuthorStatistic, Book, BookId, Comment, CommentId, Genre, GenreId,
    GenreStatistic,
};
use crate::query::BookFilter;
use crate::repositories::{
    AuthorRepository, BookRepository, CommentRepository, GenreRepository,
    SqliteAuthorRepository, SqliteBookRepository, SqliteCommentRepository,
    SqliteGenreRepository, SqliteStatisticsRepository, StatisticsRepository,
};

/// Request to register a new book. Genres and authors are given by name and
/// created when missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBookRequest {
    pub isbn: String,
    pub title: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub authors: Vec<String>,
}

/// Partial update of a book. `None` keeps the current value; `Some` of an
/// empty list clears the relation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBookRequest {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub genres: Option<Vec<String>>,
    pub authors: Option<Vec<String>>,
}

/// Book listing criteria; both fields narrow the result when present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookListQuery {
    pub author_id: Option<AuthorId>,
    pub genre_id: Option<GenreId>,
}

impl From<BookListQuery> for BookFilter {
    fn from(query: BookListQuery) -> Self {
        BookFilter {
            author_id: query.author_id,
            genre_id: query.genre_id,
            ..BookFilter::default()
        }
    }
}

#[derive(Clone)]
pub struct LibraryService {
    books: Arc<dyn BookRepository>,
    authors: Arc<dyn AuthorRepository>,
    genres: Arc<dyn GenreRepository>,
    comments: Arc<dyn CommentRepository>,
    statistics: Arc<dyn StatisticsRepository>,
    clock: Arc<dyn Clock>,
}

impl LibraryService {
    /// Service over SQLite repositories sharing `adapter`
    pub fn new(adapter: Arc<dyn DatabaseAdapter>) -> Self {
        Self::with_clock(adapter, Arc::new(SystemClock))
    }

    /// Like [`new`](Self::new) with an explicit time source for comments
    pub fn with_clock(adapter: Arc<dyn DatabaseAdapter>, clock: Arc<dyn Clock>) -> Self {
        Self {
            books: Arc::new(SqliteBookRepository::new(adapter.clone())),
            authors: Arc::new(SqliteAuthorRepository::new(adapter.clone())),
            genres: Arc::new(SqliteGenreRepository::new(adapter.clone())),
            comments: Arc::new(SqliteCommentRepository::new(adapter.clone())),
            statistics: Arc::new(SqliteStatisticsRepository::new(adapter)),
            clock,
        }
    }

    // =========================================================================
    // Books
    // =========================================================================

    /// Register a book, creating any genre or author it names.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the ISBN or title is blank or the ISBN is taken.
    pub async fn register_book(&self, request: NewBookRequest) -> Result<Book> {
        let isbn = required_text("isbn", &request.isbn)?;
        let title = required_text("title", &request.title)?;
        self.ensure_isbn_free(&isbn, None).await?;

        let mut book = Book::new(isbn, title);
        book.genres = self.resolve_genres(&request.genres).await?;
        book.authors = self.resolve_authors(&request.authors).await?;

        let id = self.books.insert(&book).await?;
        info!(book_id = %id, isbn = %book.isbn, "Registered book");
        self.get_book(id).await
    }

    pub async fn update_book(&self, id: BookId, request: UpdateBookRequest) -> Result<Book> {
        let mut book = self.get_book(id).await?;

        if let Some(isbn) = &request.isbn {
            let isbn = required_text("isbn", isbn)?;
            self.ensure_isbn_free(&isbn, Some(id)).await?;
            book.isbn = isbn;
        }
        if let Some(title) = &request.title {
            book.title = required_text("title", title)?;
        }
        if let Some(genres) = &request.genres {
            book.genres = self.resolve_genres(genres).await?;
        }
        if let Some(authors) = &request.authors {
            book.authors = self.resolve_authors(authors).await?;
        }

        self.books.update(&book).await?;
        self.get_book(id).await
    }

    pub async fn delete_book(&self, id: BookId) -> Result<()> {
        if !self.books.delete(id).await? {
            return Err(CatalogError::not_found("Book", id));
        }
        info!(book_id = %id, "Deleted book");
        Ok(())
    }

    pub async fn get_book(&self, id: BookId) -> Result<Book> {
        self.books
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Book", id))
    }

    pub async fn get_book_by_isbn(&self, isbn: &str) -> Result<Book> {
        let isbn = isbn.trim();
        self.books
            .find_by_isbn(isbn)
            .await?
            .ok_or_else(|| CatalogError::not_found("Book", isbn))
    }

    /// Books matching `query`, ordered by id
    pub async fn list_books(&self, query: BookListQuery) -> Result<Vec<Book>> {
        self.books.find(&query.into()).await
    }

    // =========================================================================
    // Authors & Genres
    // =========================================================================

    pub async fn authors(&self) -> Result<Vec<Author>> {
        self.authors.find_all().await
    }

    pub async fn genres(&self) -> Result<Vec<Genre>> {
        self.genres.find_all().await
    }

    pub async fn get_author(&self, id: AuthorId) -> Result<Author> {
        self.authors
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Author", id))
    }

    pub async fn get_genre(&self, id: GenreId) -> Result<Genre> {
        self.genres
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Genre", id))
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Attach a comment to a book. Blank text is ignored and yields `None`.
    pub async fn add_comment(&self, book_id: BookId, text: &str) -> Result<Option<Comment>> {
        let text = text.trim();
        if text.is_empty() {
            debug!(book_id = %book_id, "Ignoring blank comment");
            return Ok(None);
        }
        self.get_book(book_id).await?;

        let comment = Comment {
            id: CommentId::UNSAVED,
            book_id,
            text: text.to_string(),
            created_at: self.clock.unix_timestamp(),
        };
        self.comments.insert(&comment).await.map(Some)
    }

    pub async fn comments(&self, book_id: BookId) -> Result<Vec<Comment>> {
        self.get_book(book_id).await?;
        self.comments.find_by_book(book_id).await
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    pub async fn author_statistics(&self) -> Result<Vec<AuthorStatistic>> {
        self.statistics.author_book_counts().await
    }

    pub async fn genre_statistics(&self) -> Result<Vec<GenreStatistic>> {
        self.statistics.genre_book_counts().await
    }

    async fn ensure_isbn_free(&self, isbn: &str, owner: Option<BookId>) -> Result<()> {
        match self.books.find_by_isbn(isbn).await? {
            Some(existing) if Some(existing.id) != owner => Err(CatalogError::invalid_input(
                "isbn",
                format!("ISBN {} is already registered", isbn),
            )),
            _ => Ok(()),
        }
    }

    async fn resolve_genres(&self, names: &[String]) -> Result<BTreeSet<Arc<Genre>>> {
        let mut genres = BTreeSet::new();
        for name in normalize_names(names) {
            genres.insert(Arc::new(self.genres.find_or_create(&name).await?));
        }
        Ok(genres)
    }

    async fn resolve_authors(&self, names: &[String]) -> Result<BTreeSet<Arc<Author>>> {
        let mut authors = BTreeSet::new();
        for name in normalize_names(names) {
            authors.insert(Arc::new(self.authors.find_or_create(&name).await?));
        }
        Ok(authors)
    }
}

fn required_text(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CatalogError::invalid_input(field, "must not be blank"));
    }
    Ok(value.to_string())
}

/// Trim names, drop blanks and collapse case-insensitive duplicates.
/// The first spelling of a name wins.
pub fn normalize_names(names: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_lowercase()))
        .map(str::to_string)
        .collect()
}
