//! SQL generation for the catalog tables

pub mod schema;
pub mod select;

pub use schema::{LinkFilter, TableSchema, BOOKS, BOOK_AUTHORS_JOIN, BOOK_GENRES_JOIN};
pub use select::{ParamStyle, SelectQueryBuilder};
