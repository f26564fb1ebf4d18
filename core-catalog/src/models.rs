//! Domain models for the library catalog
//!
//! Books reference genres and authors through shared `Arc`s: the aggregating
//! reader hands the same `Genre` instance to every book that carries it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// ID Types
// =============================================================================

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Id carried by entities that have not been stored yet
            pub const UNSAVED: Self = Self(0);

            pub fn value(&self) -> i64 {
                self.0
            }

            pub fn is_saved(&self) -> bool {
                self.0 != 0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a book
    BookId
);
entity_id!(
    /// Unique identifier for a genre
    GenreId
);
entity_id!(
    /// Unique identifier for an author
    AuthorId
);
entity_id!(
    /// Unique identifier for a book comment
    CommentId
);

/// Trim a display name; used for genre and author lookups.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_string()
}

// =============================================================================
// Entities
// =============================================================================

/// Genre shared by many books
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

impl Genre {
    pub fn new(id: GenreId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Genre name cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Author shared by many books
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
}

impl Author {
    pub fn new(id: AuthorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Author name cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Book aggregate: the book row plus its genre and author sets.
///
/// Set members are ordered by id. A set never holds two entries with the same
/// id; use [`Book::add_genre`] / [`Book::add_author`] to keep it that way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub isbn: String,
    pub title: String,
    #[serde(default)]
    pub genres: BTreeSet<Arc<Genre>>,
    #[serde(default)]
    pub authors: BTreeSet<Arc<Author>>,
}

impl Book {
    /// Create an unsaved book without relations
    pub fn new(isbn: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: BookId::UNSAVED,
            isbn: isbn.into(),
            title: title.into(),
            genres: BTreeSet::new(),
            authors: BTreeSet::new(),
        }
    }

    /// Add a genre unless one with the same id is already present.
    ///
    /// Returns `true` when the genre was added.
    pub fn add_genre(&mut self, genre: Arc<Genre>) -> bool {
        if self.has_genre(genre.id) {
            return false;
        }
        self.genres.insert(genre)
    }

    /// Add an author unless one with the same id is already present.
    pub fn add_author(&mut self, author: Arc<Author>) -> bool {
        if self.has_author(author.id) {
            return false;
        }
        self.authors.insert(author)
    }

    pub fn has_genre(&self, id: GenreId) -> bool {
        self.genres.iter().any(|genre| genre.id == id)
    }

    pub fn has_author(&self, id: AuthorId) -> bool {
        self.authors.iter().any(|author| author.id == id)
    }

    pub fn genre_ids(&self) -> Vec<GenreId> {
        self.genres.iter().map(|genre| genre.id).collect()
    }

    pub fn author_ids(&self) -> Vec<AuthorId> {
        self.authors.iter().map(|author| author.id).collect()
    }

    /// Validate book data
    pub fn validate(&self) -> Result<(), String> {
        if self.isbn.trim().is_empty() {
            return Err("Book ISBN cannot be empty".to_string());
        }
        if self.title.trim().is_empty() {
            return Err("Book title cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Reader comment attached to one book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub book_id: BookId,
    pub text: String,
    /// Unix timestamp (seconds)
    pub created_at: i64,
}

impl Comment {
    pub fn validate(&self) -> Result<(), String> {
        if self.text.trim().is_empty() {
            return Err("Comment text cannot be empty".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Number of books written by one author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorStatistic {
    pub author: Author,
    pub book_count: i64,
}

/// Number of books filed under one genre
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreStatistic {
    pub genre: Genre,
    pub book_count: i64,
}

// =============================================================================
// Tests
// =============================================================================
