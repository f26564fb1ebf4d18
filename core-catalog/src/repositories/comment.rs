//! Comment repository trait and implementation

use async_trait::async_trait;
use bridge_traits::database::{DatabaseAdapter, QueryValue};
use std::sync::Arc;

use crate::error::{CatalogError, Result};
use crate::mapping::{CommentRowMapper, RowMapper};
use crate::models::{BookId, Comment, CommentId};
use crate::repositories::scalar_i64;
use crate::sql::schema::COMMENTS;
use crate::sql::{ParamStyle, SelectQueryBuilder};

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Store a comment and return it with its assigned id
    ///
    /// # Errors
    /// Returns error if the text is blank or the book does not exist.
    async fn insert(&self, comment: &Comment) -> Result<Comment>;

    /// Comments on a book, oldest first
    async fn find_by_book(&self, book_id: BookId) -> Result<Vec<Comment>>;
}

/// SQLite implementation of CommentRepository
pub struct SqliteCommentRepository {
    adapter: Arc<dyn DatabaseAdapter>,
    mapper: CommentRowMapper,
}

impl SqliteCommentRepository {
    pub fn new(adapter: Arc<dyn DatabaseAdapter>) -> Self {
        Self {
            adapter,
            mapper: CommentRowMapper::aliased("c"),
        }
    }
}

#[async_trait]
impl CommentRepository for SqliteCommentRepository {
    async fn insert(&self, comment: &Comment) -> Result<Comment> {
        comment
            .validate()
            .map_err(|msg| CatalogError::invalid_input("Comment", msg))?;

        let row = self
            .adapter
            .query_one(
                "INSERT INTO comments (book_id, text, created_at) VALUES (?1, ?2, ?3) RETURNING id",
                &[
                    QueryValue::Integer(comment.book_id.0),
                    QueryValue::Text(comment.text.clone()),
                    QueryValue::Integer(comment.created_at),
                ],
            )
            .await?;

        Ok(Comment {
            id: CommentId(scalar_i64(&row, "id")?),
            ..comment.clone()
        })
    }

    async fn find_by_book(&self, book_id: BookId) -> Result<Vec<Comment>> {
        let sql = SelectQueryBuilder::new(&COMMENTS)
            .use_alias("c")
            .use_filter_fields(["book_id"])
            .order_by("created_at")
            .param_style(ParamStyle::Numbered)
            .build()?;
        let rows = self
            .adapter
            .query(&sql, &[QueryValue::Integer(book_id.0)])
            .await?;

        rows.iter()
            .enumerate()
            .map(|(index, row)| self.mapper.map_row(row, index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Book;
    use crate::repositories::test_support::test_adapter;
    use crate::repositories::{BookRepository, SqliteBookRepository};

    fn comment(book_id: BookId, text: &str, created_at: i64) -> Comment {
        Comment {
            id: CommentId::UNSAVED,
            book_id,
            text: text.to_string(),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let adapter = test_adapter().await;
        let books = SqliteBookRepository::new(adapter.clone());
        let repo = SqliteCommentRepository::new(adapter);

        let book_id = books.insert(&Book::new("isbn-1", "Oblomov")).await.unwrap();
        let later = repo.insert(&comment(book_id, "Slow start", 200)).await.unwrap();
        let earlier = repo.insert(&comment(book_id, "Classic", 100)).await.unwrap();
        assert!(later.id.is_saved());

        let comments = repo.find_by_book(book_id).await.unwrap();
        assert_eq!(comments, vec![earlier, later]);

        assert!(repo.find_by_book(BookId(42)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_comments_deleted_with_book() {
        let adapter = test_adapter().await;
        let books = SqliteBookRepository::new(adapter.clone());
        let repo = SqliteCommentRepository::new(adapter);

        let book_id = books.insert(&Book::new("isbn-1", "Oblomov")).await.unwrap();
        repo.insert(&comment(book_id, "Hm", 1)).await.unwrap();
        books.delete(book_id).await.unwrap();

        assert!(repo.find_by_book(book_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_blank_and_orphan_comments() {
        let repo = SqliteCommentRepository::new(test_adapter().await);

        assert!(matches!(
            repo.insert(&comment(BookId(1), " ", 1)).await,
            Err(CatalogError::InvalidInput { .. })
        ));
        assert!(repo.insert(&comment(BookId(1), "Orphan", 1)).await.is_err());
    }
}
