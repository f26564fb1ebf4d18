//! Stand the catalog up the way a host application would.

use library_catalog::bridge::time::LogLevel;
use library_catalog::runtime::LogFormat;
use library_catalog::{
    bootstrap, start, BookListQuery, BootstrapError, CatalogConfig, NewBookRequest,
};

fn request(isbn: &str) -> NewBookRequest {
    NewBookRequest {
        isbn: isbn.to_string(),
        title: "Dead Souls".to_string(),
        genres: vec!["Novel".to_string()],
        authors: vec!["Gogol".to_string()],
    }
}

#[tokio::test]
async fn test_bootstrap_in_memory() {
    let config = CatalogConfig::builder().build().unwrap();
    let service = bootstrap(&config).await.unwrap();

    let book = service.register_book(request("isbn-1")).await.unwrap();
    let listed = service.list_books(BookListQuery::default()).await.unwrap();
    assert_eq!(listed, vec![book]);
}

#[tokio::test]
async fn test_bootstrap_file_store_survives_reopen() {
    let path = std::env::temp_dir().join(format!("library-catalog-{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let config = CatalogConfig::builder()
        .database_path(&path)
        .max_connections(2)
        .build()
        .unwrap();

    {
        let service = bootstrap(&config).await.unwrap();
        service.register_book(request("isbn-2")).await.unwrap();
    }

    let reopened = bootstrap(&config).await.unwrap();
    let book = reopened.get_book_by_isbn("isbn-2").await.unwrap();
    assert_eq!(book.authors.iter().next().unwrap().name, "Gogol");

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_bootstrap_rejects_invalid_config() {
    let mut config = CatalogConfig::default();
    config.max_connections = 0;

    assert!(matches!(
        bootstrap(&config).await,
        Err(BootstrapError::Runtime(_))
    ));
}

#[tokio::test]
async fn test_start_installs_logging_once() {
    let config = CatalogConfig::builder()
        .log_level(LogLevel::Warn)
        .log_format(LogFormat::Compact)
        .build()
        .unwrap();

    assert!(start(&config).await.is_ok());
    assert!(matches!(start(&config).await, Err(BootstrapError::Runtime(_))));
}
