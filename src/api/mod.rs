//! API handlers for BookFinder REST endpoints

pub mod auth;
pub mod books;
pub mod bookshelves;
pub mod favorites;
pub mod health;
pub mod mylibrary;
pub mod notes;
pub mod openapi;
pub mod reading_list;
pub mod reviews;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post, put},
    Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, AppState};

/// Catalog access token of a signed-in visitor, forwarded to the catalog library
pub struct LibraryToken(pub String);

#[async_trait]
impl FromRequestParts<AppState> for LibraryToken {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Authentication("Missing bearer token".to_string()))?;

        let token = bearer.token().trim();
        if token.is_empty() {
            return Err(AppError::Authentication("Missing bearer token".to_string()));
        }
        Ok(LibraryToken(token.to_string()))
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/status", get(auth::status))
        .route("/auth/login", get(auth::login))
        .route("/auth/logout", get(auth::logout))
        // Catalog
        .route("/books/search", get(books::search_books))
        .route("/books/:id", get(books::get_book))
        .route("/books/:id/related", get(books::related_books))
        // Favorites
        .route("/favorites", get(favorites::list_favorites).post(favorites::add_favorite))
        .route("/favorites/:book_id", axum::routing::delete(favorites::remove_favorite))
        // Reading list
        .route(
            "/reading-list",
            get(reading_list::list_reading_list).post(reading_list::add_to_reading_list),
        )
        .route(
            "/reading-list/:book_id",
            put(reading_list::update_reading_status).delete(reading_list::remove_from_reading_list),
        )
        // Notes
        .route("/notes/:book_id", get(notes::list_notes).post(notes::add_note))
        .route("/notes/:book_id/:note_id", put(notes::update_note).delete(notes::delete_note))
        // Reviews
        .route(
            "/reviews/:book_id",
            get(reviews::get_review)
                .post(reviews::save_review)
                .delete(reviews::delete_review),
        )
        // Local bookshelves
        .route("/bookshelves", get(bookshelves::list_shelves).post(bookshelves::create_shelf))
        .route(
            "/bookshelves/:shelf_id",
            put(bookshelves::rename_shelf).delete(bookshelves::delete_shelf),
        )
        .route(
            "/bookshelves/:shelf_id/books",
            get(bookshelves::list_shelf_books).post(bookshelves::add_shelf_book),
        )
        .route(
            "/bookshelves/:shelf_id/books/:book_id",
            axum::routing::delete(bookshelves::remove_shelf_book),
        )
        // Catalog library of the signed-in visitor
        .route("/mylibrary/bookshelves", get(mylibrary::list_shelves))
        .route("/mylibrary/bookshelves/:shelf_id/addVolume", post(mylibrary::add_volume))
        .route("/mylibrary/bookshelves/:shelf_id/removeVolume", post(mylibrary::remove_volume))
        .route("/mylibrary/bookshelves/:shelf_id/volumes", get(mylibrary::list_volumes))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .merge(openapi::create_openapi_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        models::{shelf::ShelvesResponse, AuthStatus},
        repository::Repository,
    };
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::new(AppConfig::default(), Repository::in_memory()).unwrap();
        create_router(state)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn book(id: &str) -> Value {
        json!({ "id": id, "volumeInfo": { "title": format!("Title {id}"), "authors": ["Ada"] } })
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_auth_status_without_token_is_anonymous() {
        let (status, body) = send(&app(), Method::GET, "/api/auth/status", None).await;
        assert_eq!(status, StatusCode::OK);
        let parsed: AuthStatus = serde_json::from_value(body).unwrap();
        assert_eq!(parsed, AuthStatus::anonymous());
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let (status, body) = send(&app(), Method::GET, "/api/books/search", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_default_shelves_listed() {
        let (status, body) = send(&app(), Method::GET, "/api/bookshelves?user_id=anon-1", None).await;
        assert_eq!(status, StatusCode::OK);
        let parsed: ShelvesResponse = serde_json::from_value(body).unwrap();
        let ids: Vec<_> = parsed.shelves.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);
        assert!(parsed.shelves.iter().all(|s| s.book_count == 0));
    }

    #[tokio::test]
    async fn test_add_and_remove_shelf_book() {
        let app = app();
        let add = json!({ "user_id": "anon-1", "book": book("b1") });

        let (status, _) = send(&app, Method::POST, "/api/bookshelves/2/books", Some(add.clone())).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, Method::POST, "/api/bookshelves/2/books", Some(add)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Book already on shelf");

        let (_, body) = send(&app, Method::GET, "/api/bookshelves/2/books?user_id=anon-1", None).await;
        assert_eq!(body["books"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["books"][0]["id"], "b1");
        assert_eq!(body["shelf"]["name"], "To Read");

        let (status, _) = send(&app, Method::DELETE, "/api/bookshelves/2/books/b1?user_id=anon-1", None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = send(&app, Method::GET, "/api/bookshelves/2/books?user_id=anon-1", None).await;
        assert_eq!(body["books"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn test_unknown_shelf_is_not_found() {
        let (status, body) = send(&app(), Method::GET, "/api/bookshelves/9999/books?user_id=u", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Bookshelf not found");
    }

    #[tokio::test]
    async fn test_custom_shelf_lifecycle() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/bookshelves",
            Some(json!({ "user_id": "u", "name": "Sci-fi" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["shelf"]["id"], "1001");

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/bookshelves/1001",
            Some(json!({ "user_id": "u", "name": "Space" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, Method::DELETE, "/api/bookshelves/0?user_id=u", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, Method::DELETE, "/api/bookshelves/1001?user_id=u", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_shelf_requires_name() {
        let (status, _) = send(
            &app(),
            Method::POST,
            "/api/bookshelves",
            Some(json!({ "user_id": "u", "name": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_review_rating_range() {
        let app = app();
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/reviews/b1",
            Some(json!({ "user_id": "u", "rating": 7 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/reviews/b1",
            Some(json!({ "user_id": "u", "rating": 4, "text": "Good" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["review"]["rating"], 4);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/reviews/b1",
            Some(json!({ "user_id": "u", "rating": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_notes_flow() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/notes/b1",
            Some(json!({ "user_id": "u", "text": "Chapter 3" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let note_id = body["note"]["id"].as_str().unwrap().to_string();

        let (_, body) = send(&app, Method::GET, "/api/notes/b1?user_id=u", None).await;
        assert_eq!(body["notes"].as_array().map(Vec::len), Some(1));

        let uri = format!("/api/notes/b1/{note_id}?user_id=u");
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_favorites_and_reading_list() {
        let app = app();
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/favorites",
            Some(json!({ "user_id": "u", "book_id": "b1", "bookInfo": { "title": "Dune" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = send(&app, Method::GET, "/api/favorites?user_id=u", None).await;
        assert_eq!(body["items"][0]["id"], "b1");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/reading-list",
            Some(json!({ "user_id": "u", "book_id": "b1", "bookInfo": { "title": "Dune" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/reading-list/b1",
            Some(json!({ "user_id": "u", "status": "reading", "progress": 40 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = send(&app, Method::GET, "/api/reading-list?user_id=u", None).await;
        assert_eq!(body["items"][0]["status"], "reading");
        assert_eq!(body["items"][0]["progress"], 40);
    }

    #[tokio::test]
    async fn test_library_requires_bearer() {
        let (status, body) = send(&app(), Method::GET, "/api/mylibrary/bookshelves", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());
    }
}
