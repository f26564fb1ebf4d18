use bridge_traits::database::{QueryRow, QueryValue};

use super::translator::{ColumnNameTranslator, IdentityTranslator, PrefixCutTranslator};
use super::view::RowView;
use crate::error::{CatalogError, Result};
use crate::models::{Author, AuthorId, Book, BookId, Comment, CommentId, Genre, GenreId};

/// Materialises one entity from one row.
///
/// A mapper only reads the row it is given; it never advances the stream.
/// Column names are resolved through the mapper's translator, so the same
/// mapper type serves `SELECT * FROM genres` and a join aliasing genres as `g`.
pub trait RowMapper: Send + Sync {
    type Entity;

    fn translator(&self) -> &dyn ColumnNameTranslator;

    fn map_view(&self, view: &RowView<'_>) -> Result<Self::Entity>;

    fn map_row(&self, row: &QueryRow, row_index: usize) -> Result<Self::Entity> {
        let view = RowView::new(row, row_index, self.translator())?;
        self.map_view(&view)
    }

    /// Entity id carried by `row`.
    ///
    /// `Ok(None)` when the id is NULL or 0, which is what a left join that
    /// matched nothing produces.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Mapping` if the id column is absent or not an
    /// integer.
    fn key(&self, row: &QueryRow, row_index: usize) -> Result<Option<i64>> {
        let column = self.translator().qualify("id");
        match row.get(&column) {
            None => Err(CatalogError::Mapping {
                column,
                row: row_index,
                message: "missing column in result set".to_string(),
            }),
            Some(QueryValue::Null) | Some(QueryValue::Integer(0)) => Ok(None),
            Some(QueryValue::Integer(id)) => Ok(Some(*id)),
            Some(other) => Err(CatalogError::Mapping {
                column,
                row: row_index,
                message: format!("expected integer, found {}", other.type_name()),
            }),
        }
    }
}

macro_rules! mapper_constructors {
    ($mapper:ident) => {
        impl $mapper {
            pub fn new(translator: impl ColumnNameTranslator + 'static) -> Self {
                Self {
                    translator: Box::new(translator),
                }
            }

            /// Mapper for columns labelled `<alias>.<column>`
            pub fn aliased(alias: &str) -> Self {
                Self::new(PrefixCutTranslator::for_alias(alias))
            }

            /// Mapper for unqualified single-table rows
            pub fn unprefixed() -> Self {
                Self::new(IdentityTranslator)
            }
        }
    };
}

/// Maps the book columns of a row. Relation sets start empty.
pub struct BookRowMapper {
    translator: Box<dyn ColumnNameTranslator>,
}

mapper_constructors!(BookRowMapper);

impl RowMapper for BookRowMapper {
    type Entity = Book;

    fn translator(&self) -> &dyn ColumnNameTranslator {
        self.translator.as_ref()
    }

    fn map_view(&self, view: &RowView<'_>) -> Result<Book> {
        let mut book = Book::new(view.string("isbn")?, view.string("title")?);
        book.id = BookId(view.i64("id")?);
        Ok(book)
    }
}

pub struct GenreRowMapper {
    translator: Box<dyn ColumnNameTranslator>,
}

mapper_constructors!(GenreRowMapper);

impl RowMapper for GenreRowMapper {
    type Entity = Genre;

    fn translator(&self) -> &dyn ColumnNameTranslator {
        self.translator.as_ref()
    }

    fn map_view(&self, view: &RowView<'_>) -> Result<Genre> {
        Ok(Genre::new(GenreId(view.i64("id")?), view.string("name")?))
    }
}

pub struct AuthorRowMapper {
    translator: Box<dyn ColumnNameTranslator>,
}

mapper_constructors!(AuthorRowMapper);

impl RowMapper for AuthorRowMapper {
    type Entity = Author;

    fn translator(&self) -> &dyn ColumnNameTranslator {
        self.translator.as_ref()
    }

    fn map_view(&self, view: &RowView<'_>) -> Result<Author> {
        Ok(Author::new(AuthorId(view.i64("id")?), view.string("name")?))
    }
}

pub struct CommentRowMapper {
    translator: Box<dyn ColumnNameTranslator>,
}

mapper_constructors!(CommentRowMapper);

impl RowMapper for CommentRowMapper {
    type Entity = Comment;

    fn translator(&self) -> &dyn ColumnNameTranslator {
        self.translator.as_ref()
    }

    fn map_view(&self, view: &RowView<'_>) -> Result<Comment> {
        Ok(Comment {
            id: CommentId(view.i64("id")?),
            book_id: BookId(view.i64("book_id")?),
            text: view.string("text")?,
            created_at: view.i64("created_at")?,
        })
    }
}
