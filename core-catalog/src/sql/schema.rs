//! Static description of the catalog tables, used to validate generated SQL.

/// Filter on a many-to-many relation, resolved through a link table.
///
/// Filtering books by `genre_id` means "books linked to that genre", which is
/// a sub-select on `books_genres` rather than a column of `books`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkFilter {
    /// Filter field name as callers spell it
    pub field: &'static str,
    /// Link table
    pub table: &'static str,
    /// Link column pointing back at the filtered table
    pub owner_column: &'static str,
    /// Link column compared with the filter value
    pub target_column: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [&'static str],
    pub links: &'static [LinkFilter],
}

impl TableSchema {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(&column)
    }

    pub fn link(&self, field: &str) -> Option<&'static LinkFilter> {
        self.links.iter().find(|link| link.field == field)
    }

    /// Whether `field` may appear in a WHERE clause against this table
    pub fn is_filterable(&self, field: &str) -> bool {
        self.has_column(field) || self.link(field).is_some()
    }
}

pub const BOOKS: TableSchema = TableSchema {
    name: "books",
    primary_key: "id",
    columns: &["id", "isbn", "title"],
    links: &[
        LinkFilter {
            field: "genre_id",
            table: "books_genres",
            owner_column: "book_id",
            target_column: "genre_id",
        },
        LinkFilter {
            field: "author_id",
            table: "books_authors",
            owner_column: "book_id",
            target_column: "author_id",
        },
    ],
};

pub const GENRES: TableSchema = TableSchema {
    name: "genres",
    primary_key: "id",
    columns: &["id", "name"],
    links: &[],
};

pub const AUTHORS: TableSchema = TableSchema {
    name: "authors",
    primary_key: "id",
    columns: &["id", "name"],
    links: &[],
};

pub const COMMENTS: TableSchema = TableSchema {
    name: "comments",
    primary_key: "id",
    columns: &["id", "book_id", "text", "created_at"],
    links: &[],
};

/// Left join from books (`b`) to their genres (`g`)
pub const BOOK_GENRES_JOIN: &str =
    "LEFT JOIN books_genres bg ON bg.book_id = b.id LEFT JOIN genres g ON g.id = bg.genre_id";

/// Left join from books (`b`) to their authors (`a`)
pub const BOOK_AUTHORS_JOIN: &str =
    "LEFT JOIN books_authors ba ON ba.book_id = b.id LEFT JOIN authors a ON a.id = ba.author_id";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_books_filterable_fields() {
        assert!(BOOKS.is_filterable("isbn"));
        assert!(BOOKS.is_filterable("genre_id"));
        assert!(!BOOKS.is_filterable("name"));
        assert_eq!(BOOKS.link("author_id").map(|l| l.table), Some("books_authors"));
        assert!(!GENRES.is_filterable("genre_id"));
    }
}
