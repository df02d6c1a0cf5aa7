//! Favorite book endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        favorite::{AddFavorite, FavoritesResponse},
        user::{resolve_user_id, UserQuery},
        ActionResponse,
    },
};

/// List a visitor's favorites
#[utoipa::path(
    get,
    path = "/favorites",
    tag = "favorites",
    params(UserQuery),
    responses((status = 200, description = "Favorite books", body = FavoritesResponse))
)]
pub async fn list_favorites(
    State(state): State<crate::AppState>,
    Query(user): Query<UserQuery>,
) -> AppResult<Json<FavoritesResponse>> {
    let items = state.services.favorites.list(user.user_id()).await?;
    Ok(Json(FavoritesResponse { items }))
}

/// Mark a book as favorite
#[utoipa::path(
    post,
    path = "/favorites",
    tag = "favorites",
    request_body = AddFavorite,
    responses(
        (status = 200, description = "Book marked as favorite", body = ActionResponse),
        (status = 400, description = "Missing book id", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_favorite(
    State(state): State<crate::AppState>,
    Json(request): Json<AddFavorite>,
) -> AppResult<Json<ActionResponse>> {
    request.validate()?;

    let user_id = resolve_user_id(request.user_id.as_deref());
    state
        .services
        .favorites
        .add(user_id, &request.book_id, request.book_info)
        .await?;
    Ok(Json(ActionResponse::ok("Book added to favorites")))
}

/// Unmark a favorite
#[utoipa::path(
    delete,
    path = "/favorites/{book_id}",
    tag = "favorites",
    params(("book_id" = String, Path, description = "Catalog volume ID"), UserQuery),
    responses(
        (status = 200, description = "Favorite removed", body = ActionResponse),
        (status = 404, description = "Not a favorite", body = crate::error::ErrorResponse)
    )
)]
pub async fn remove_favorite(
    State(state): State<crate::AppState>,
    Path(book_id): Path<String>,
    Query(user): Query<UserQuery>,
) -> AppResult<Json<ActionResponse>> {
    state.services.favorites.remove(user.user_id(), &book_id).await?;
    Ok(Json(ActionResponse::ok("Book removed from favorites")))
}
