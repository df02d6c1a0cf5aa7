//! API integration tests
//!
//! Each test starts a server on an ephemeral port with an in-memory shelf
//! store and drives it through the client library.

use std::{net::SocketAddr, sync::Arc};

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use bookfinder_server::{
    api,
    client::{
        ApiClient, ClientConfig, LibraryBackend, LocalShelfBackend, MemoryStorage,
        SessionResolver, ShelfListState, ShelfSynchronizer,
    },
    config::AppConfig,
    models::{Book, Identity, VolumeInfo},
    repository::Repository,
    AppState,
};

async fn spawn_server() -> SocketAddr {
    let state = AppState::new(AppConfig::default(), Repository::in_memory()).expect("Failed to create state");
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });
    addr
}

fn api_client(addr: SocketAddr) -> ApiClient {
    ApiClient::new(ClientConfig::new(format!("http://{}", addr))).expect("Failed to build client")
}

async fn anonymous_session(addr: SocketAddr) -> (Arc<SessionResolver>, Arc<ShelfSynchronizer>) {
    let api = api_client(addr);
    let resolver = Arc::new(SessionResolver::new(
        Arc::new(api.clone()),
        Arc::new(MemoryStorage::new()),
    ));
    let synchronizer = Arc::new(ShelfSynchronizer::new(
        Arc::new(LibraryBackend::new(api.clone())),
        Arc::new(LocalShelfBackend::new(api)),
    ));

    let identity = resolver.check_auth_status().await;
    synchronizer.set_identity(Some(identity)).await;
    (resolver, synchronizer)
}

fn book(id: &str, title: &str) -> Book {
    Book {
        id: id.to_string(),
        volume_info: VolumeInfo {
            title: title.to_string(),
            authors: Some(vec!["Frank Herbert".to_string()]),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn test_health_check() {
    let addr = spawn_server().await;

    let response = Client::new()
        .get(format!("http://{}/api/health", addr))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_anonymous_visitor_gets_default_shelves() {
    let addr = spawn_server().await;
    let (resolver, synchronizer) = anonymous_session(addr).await;

    let identity = resolver.identity().await.expect("Identity not resolved");
    assert!(matches!(identity, Identity::Anonymous(ref id) if id.starts_with("anon-")));
    assert!(!resolver.is_loading().await);

    let names: Vec<_> = synchronizer.shelves().await.into_iter().map(|s| s.name).collect();
    assert_eq!(
        names,
        vec!["Favorites", "Purchased", "To Read", "Reading Now", "Have Read"]
    );
}

#[tokio::test]
async fn test_add_then_list_exactly_once() {
    let addr = spawn_server().await;
    let (_, synchronizer) = anonymous_session(addr).await;
    let dune = book("dune-1", "Dune");

    assert!(synchronizer.add_book_to_shelf("2", &dune).await);
    assert!(synchronizer.add_book_to_shelf("2", &dune).await);

    let entries = synchronizer.get_books_in_shelf("2").await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, "dune-1");
    assert_eq!(entries[0].volume_info, dune.volume_info);

    let to_read = synchronizer
        .shelves()
        .await
        .into_iter()
        .find(|s| s.id == "2")
        .expect("Shelf missing");
    assert_eq!(to_read.book_count, 1);
}

#[tokio::test]
async fn test_remove_then_list() {
    let addr = spawn_server().await;
    let (_, synchronizer) = anonymous_session(addr).await;

    assert!(synchronizer.add_book_to_shelf("3", &book("b1", "Emma")).await);
    assert!(synchronizer.remove_book_from_shelf("3", "b1").await);
    assert!(synchronizer.get_books_in_shelf("3").await.is_empty());

    // Already gone
    assert!(!synchronizer.remove_book_from_shelf("3", "b1").await);
}

#[tokio::test]
async fn test_missing_shelf_lists_empty() {
    let addr = spawn_server().await;
    let (_, synchronizer) = anonymous_session(addr).await;

    assert!(synchronizer.get_books_in_shelf("9999").await.is_empty());
    assert!(!synchronizer.add_book_to_shelf("9999", &book("b1", "Emma")).await);
    assert!(matches!(synchronizer.state().await, ShelfListState::Ready(_)));
}

#[tokio::test]
async fn test_visitors_are_isolated() {
    let addr = spawn_server().await;
    let (_, first) = anonymous_session(addr).await;
    let (_, second) = anonymous_session(addr).await;

    assert!(first.add_book_to_shelf("0", &book("b1", "Emma")).await);
    assert_eq!(first.get_books_in_shelf("0").await.len(), 1);
    assert!(second.get_books_in_shelf("0").await.is_empty());
}

#[tokio::test]
async fn test_library_without_token_fails_closed() {
    let addr = spawn_server().await;
    let api = api_client(addr);
    let synchronizer = ShelfSynchronizer::new(
        Arc::new(LibraryBackend::new(api.clone())),
        Arc::new(LocalShelfBackend::new(api)),
    );
    synchronizer
        .set_identity(Some(Identity::Authenticated(bookfinder_server::models::UserInfo {
            id: "u-1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            picture: None,
        })))
        .await;

    assert!(synchronizer.error().await.is_some());
    assert!(!synchronizer.add_book_to_shelf("0", &book("b1", "Emma")).await);
}

#[tokio::test]
async fn test_search_without_query_is_bad_request() {
    let addr = spawn_server().await;

    let response = Client::new()
        .get(format!("http://{}/api/books/search", addr))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_custom_shelf_via_http() {
    let addr = spawn_server().await;
    let client = Client::new();

    let response = client
        .post(format!("http://{}/api/bookshelves", addr))
        .json(&json!({ "user_id": "anon-http", "name": "Sci-fi" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .put(format!("http://{}/api/bookshelves/3", addr))
        .json(&json!({ "user_id": "anon-http", "name": "Renamed" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
