//! Row mapping
//!
//! Turns flattened result-set rows into domain entities. Each entity has its
//! own [`RowMapper`]; a [`ColumnNameTranslator`] tells the mapper which
//! columns of the row belong to it.

pub mod row_mapper;
pub mod translator;
pub mod view;

pub use row_mapper::{AuthorRowMapper, BookRowMapper, CommentRowMapper, GenreRowMapper, RowMapper};
pub use translator::{ColumnNameTranslator, IdentityTranslator, PrefixCutTranslator};
pub use view::RowView;
