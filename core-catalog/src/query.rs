//! Typed book filters.
//!
//! A filter names the book fields to match; each present field becomes one
//! equality predicate in the generated WHERE clause.

use bridge_traits::database::QueryValue;
use serde::{Deserialize, Serialize};

use crate::models::{AuthorId, BookId, GenreId};

/// Filter options for querying books. Absent fields do not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookFilter {
    pub id: Option<BookId>,
    pub isbn: Option<String>,
    pub title: Option<String>,
    /// Books written by this author
    pub author_id: Option<AuthorId>,
    /// Books filed under this genre
    pub genre_id: Option<GenreId>,
}

impl BookFilter {
    pub fn by_id(id: BookId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_isbn(isbn: impl Into<String>) -> Self {
        Self {
            isbn: Some(isbn.into()),
            ..Self::default()
        }
    }

    pub fn by_author(author_id: AuthorId) -> Self {
        Self {
            author_id: Some(author_id),
            ..Self::default()
        }
    }

    pub fn by_genre(genre_id: GenreId) -> Self {
        Self {
            genre_id: Some(genre_id),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Present fields with their bind values, in a fixed order.
    ///
    /// The order matches the numbered placeholders the query builder emits
    /// for the same field list.
    pub fn fields(&self) -> Vec<(&'static str, QueryValue)> {
        let mut fields = Vec::new();
        if let Some(id) = self.id {
            fields.push(("id", QueryValue::Integer(id.0)));
        }
        if let Some(isbn) = &self.isbn {
            fields.push(("isbn", QueryValue::Text(isbn.clone())));
        }
        if let Some(title) = &self.title {
            fields.push(("title", QueryValue::Text(title.clone())));
        }
        if let Some(author_id) = self.author_id {
            fields.push(("author_id", QueryValue::Integer(author_id.0)));
        }
        if let Some(genre_id) = self.genre_id {
            fields.push(("genre_id", QueryValue::Integer(genre_id.0)));
        }
        fields
    }
}
