//! End-to-end catalog tests against an in-memory SQLite store.

use std::sync::Arc;

use bridge_traits::database::{DatabaseAdapter, QueryValue};
use core_catalog::adapters::SqliteAdapter;
use core_catalog::db::create_test_pool;
use core_catalog::mapping::{AuthorRowMapper, BookRowMapper, GenreRowMapper};
use core_catalog::sql::{ParamStyle, SelectQueryBuilder, BOOKS, BOOK_AUTHORS_JOIN, BOOK_GENRES_JOIN};
use core_catalog::{
    AggregatingResultSetReader, BookId, BookListQuery, CatalogError, LibraryService,
    NewBookRequest,
};

async fn adapter() -> Arc<dyn DatabaseAdapter> {
    Arc::new(SqliteAdapter::from_pool(create_test_pool().await.unwrap()))
}

fn new_book(isbn: &str, title: &str, genres: &[&str], authors: &[&str]) -> NewBookRequest {
    NewBookRequest {
        isbn: isbn.to_string(),
        title: title.to_string(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        authors: authors.iter().map(|a| a.to_string()).collect(),
    }
}

#[tokio::test]
async fn builder_and_reader_collapse_the_join() {
    let adapter = adapter().await;
    let service = LibraryService::new(adapter.clone());
    service
        .register_book(new_book(
            "isbn-1",
            "The Golden Calf",
            &["Satire", "Novel"],
            &["Ilf", "Petrov", "Ilf"],
        ))
        .await
        .unwrap();

    let sql = SelectQueryBuilder::new(&BOOKS)
        .use_alias("b")
        .join(BOOK_GENRES_JOIN)
        .join(BOOK_AUTHORS_JOIN)
        .project("g", &["id", "name"])
        .project("a", &["id", "name"])
        .use_filter_fields(["isbn"])
        .param_style(ParamStyle::Numbered)
        .build()
        .unwrap();

    // 2 genres x 2 authors
    let rows = adapter
        .query(&sql, &[QueryValue::Text("isbn-1".into())])
        .await
        .unwrap();
    assert_eq!(rows.len(), 4);

    let mut stream = adapter
        .query_rows(&sql, &[QueryValue::Text("isbn-1".into())])
        .await
        .unwrap();
    let books = AggregatingResultSetReader::aggregate(
        &mut stream,
        &BookRowMapper::aliased("b"),
        &GenreRowMapper::aliased("g"),
        &AuthorRowMapper::aliased("a"),
    )
    .unwrap();

    assert_eq!(books.len(), 1);
    let book = books.values().next().unwrap();
    assert_eq!(book.genres.len(), 2);
    assert_eq!(book.authors.len(), 2);
}

#[tokio::test]
async fn limit_one_on_unique_field_yields_one_book() {
    let adapter = adapter().await;
    let service = LibraryService::new(adapter.clone());
    for isbn in ["isbn-1", "isbn-2", "isbn-3"] {
        service
            .register_book(new_book(isbn, "Same Title", &["Drama", "Poetry"], &["Anon"]))
            .await
            .unwrap();
    }

    let sql = SelectQueryBuilder::new(&BOOKS)
        .use_alias("b")
        .join(BOOK_GENRES_JOIN)
        .join(BOOK_AUTHORS_JOIN)
        .project("g", &["id", "name"])
        .project("a", &["id", "name"])
        .use_filter_fields(["title"])
        .param_style(ParamStyle::Numbered)
        .limit(1)
        .build()
        .unwrap();

    let mut stream = adapter
        .query_rows(&sql, &[QueryValue::Text("Same Title".into())])
        .await
        .unwrap();
    let books = AggregatingResultSetReader::aggregate(
        &mut stream,
        &BookRowMapper::aliased("b"),
        &GenreRowMapper::aliased("g"),
        &AuthorRowMapper::aliased("a"),
    )
    .unwrap();

    assert_eq!(books.len(), 1);
    assert_eq!(books.values().next().unwrap().genres.len(), 2);
}

#[tokio::test]
async fn service_round_trip() {
    let service = LibraryService::new(adapter().await);

    let book = service
        .register_book(new_book("isbn-7", "Anna Karenina", &["Novel"], &["Tolstoy"]))
        .await
        .unwrap();
    service.add_comment(book.id, "Long but worth it").await.unwrap();

    let listed = service.list_books(BookListQuery::default()).await.unwrap();
    assert_eq!(listed, vec![book.clone()]);
    assert_eq!(service.comments(book.id).await.unwrap().len(), 1);

    let json = serde_json::to_value(&book).unwrap();
    assert_eq!(json["authors"][0]["name"], "Tolstoy");

    service.delete_book(book.id).await.unwrap();
    assert!(matches!(
        service.get_book(book.id).await,
        Err(CatalogError::NotFound { .. })
    ));
    assert!(matches!(
        service.comments(BookId(book.id.0)).await,
        Err(CatalogError::NotFound { .. })
    ));
}
