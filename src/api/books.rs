//! Catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{user::UserQuery, Book, SearchResults},
    services::catalog::SearchParams,
};

#[derive(Serialize, Deserialize, ToSchema)]
pub struct RelatedBooksResponse {
    pub items: Vec<Book>,
}

/// Search the catalog
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching volumes", body = SearchResults),
        (status = 400, description = "Missing query", body = crate::error::ErrorResponse),
        (status = 502, description = "Catalog unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<SearchResults>> {
    let results = state.services.catalog.search(&params).await?;
    Ok(Json(results))
}

/// Get a book with what the visitor recorded about it
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Catalog volume ID"),
        UserQuery
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Query(user): Query<UserQuery>,
) -> AppResult<Json<Book>> {
    let mut book = state.services.catalog.get_volume(&id).await?;
    book.user_info = state.services.user_book_info(user.user_id(), &id).await?;
    Ok(Json(book))
}

/// Books by the same author, or in the same category
#[utoipa::path(
    get,
    path = "/books/{id}/related",
    tag = "books",
    params(("id" = String, Path, description = "Catalog volume ID")),
    responses(
        (status = 200, description = "Up to five related books", body = RelatedBooksResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn related_books(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<RelatedBooksResponse>> {
    let book = state.services.catalog.get_volume(&id).await?;
    let items = state.services.catalog.related(&book).await?;
    Ok(Json(RelatedBooksResponse { items }))
}
