//! Local bookshelf endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        shelf::{
            AddShelfBook, CreateShelf, CreateShelfResponse, RenameShelf, ShelfBooksResponse,
            ShelvesResponse,
        },
        user::{resolve_user_id, UserQuery},
        ActionResponse,
    },
    services::shelves::AddOutcome,
};

/// List a visitor's shelves
#[utoipa::path(
    get,
    path = "/bookshelves",
    tag = "bookshelves",
    params(UserQuery),
    responses((status = 200, description = "Shelves with book counts", body = ShelvesResponse))
)]
pub async fn list_shelves(
    State(state): State<crate::AppState>,
    Query(user): Query<UserQuery>,
) -> AppResult<Json<ShelvesResponse>> {
    let shelves = state.services.shelves.list(user.user_id()).await?;
    Ok(Json(ShelvesResponse { shelves }))
}

/// Create a custom shelf
#[utoipa::path(
    post,
    path = "/bookshelves",
    tag = "bookshelves",
    request_body = CreateShelf,
    responses(
        (status = 201, description = "Shelf created", body = CreateShelfResponse),
        (status = 400, description = "Missing name", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_shelf(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateShelf>,
) -> AppResult<(StatusCode, Json<CreateShelfResponse>)> {
    request.validate()?;

    let user_id = resolve_user_id(request.user_id.as_deref());
    let shelf = state.services.shelves.create(user_id, &request.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateShelfResponse {
            success: true,
            shelf,
        }),
    ))
}

/// Rename a custom shelf
#[utoipa::path(
    put,
    path = "/bookshelves/{shelf_id}",
    tag = "bookshelves",
    params(("shelf_id" = String, Path, description = "Shelf ID")),
    request_body = RenameShelf,
    responses(
        (status = 200, description = "Shelf renamed", body = ActionResponse),
        (status = 403, description = "Default shelves cannot be renamed", body = crate::error::ErrorResponse),
        (status = 404, description = "Shelf not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn rename_shelf(
    State(state): State<crate::AppState>,
    Path(shelf_id): Path<String>,
    Json(request): Json<RenameShelf>,
) -> AppResult<Json<ActionResponse>> {
    request.validate()?;

    let user_id = resolve_user_id(request.user_id.as_deref());
    state
        .services
        .shelves
        .rename(user_id, &shelf_id, &request.name)
        .await?;
    Ok(Json(ActionResponse::ok("Bookshelf updated")))
}

/// Delete a custom shelf
#[utoipa::path(
    delete,
    path = "/bookshelves/{shelf_id}",
    tag = "bookshelves",
    params(("shelf_id" = String, Path, description = "Shelf ID"), UserQuery),
    responses(
        (status = 200, description = "Shelf deleted", body = ActionResponse),
        (status = 403, description = "Default shelves cannot be deleted", body = crate::error::ErrorResponse),
        (status = 404, description = "Shelf not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_shelf(
    State(state): State<crate::AppState>,
    Path(shelf_id): Path<String>,
    Query(user): Query<UserQuery>,
) -> AppResult<Json<ActionResponse>> {
    state.services.shelves.delete(user.user_id(), &shelf_id).await?;
    Ok(Json(ActionResponse::ok("Bookshelf deleted")))
}

/// Books on a shelf
#[utoipa::path(
    get,
    path = "/bookshelves/{shelf_id}/books",
    tag = "bookshelves",
    params(("shelf_id" = String, Path, description = "Shelf ID"), UserQuery),
    responses(
        (status = 200, description = "Shelf entries", body = ShelfBooksResponse),
        (status = 404, description = "Shelf not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_shelf_books(
    State(state): State<crate::AppState>,
    Path(shelf_id): Path<String>,
    Query(user): Query<UserQuery>,
) -> AppResult<Json<ShelfBooksResponse>> {
    let (shelf, books) = state.services.shelves.books(user.user_id(), &shelf_id).await?;
    Ok(Json(ShelfBooksResponse { shelf, books }))
}

/// Put a book on a shelf
#[utoipa::path(
    post,
    path = "/bookshelves/{shelf_id}/books",
    tag = "bookshelves",
    params(("shelf_id" = String, Path, description = "Shelf ID"), UserQuery),
    request_body = AddShelfBook,
    responses(
        (status = 200, description = "Book on shelf", body = ActionResponse),
        (status = 404, description = "Shelf not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_shelf_book(
    State(state): State<crate::AppState>,
    Path(shelf_id): Path<String>,
    Query(user): Query<UserQuery>,
    Json(request): Json<AddShelfBook>,
) -> AppResult<Json<ActionResponse>> {
    let user_id = resolve_user_id(request.user_id.as_deref().or(user.user_id.as_deref()));
    let outcome = state
        .services
        .shelves
        .add_book(user_id, &shelf_id, request.book, request.added_at)
        .await?;

    let message = match outcome {
        AddOutcome::Added => "Book added to shelf",
        AddOutcome::AlreadyPresent => "Book already on shelf",
    };
    Ok(Json(ActionResponse::ok(message)))
}

/// Take a book off a shelf
#[utoipa::path(
    delete,
    path = "/bookshelves/{shelf_id}/books/{book_id}",
    tag = "bookshelves",
    params(
        ("shelf_id" = String, Path, description = "Shelf ID"),
        ("book_id" = String, Path, description = "Catalog volume ID"),
        UserQuery
    ),
    responses(
        (status = 200, description = "Book removed", body = ActionResponse),
        (status = 404, description = "Shelf or book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn remove_shelf_book(
    State(state): State<crate::AppState>,
    Path((shelf_id, book_id)): Path<(String, String)>,
    Query(user): Query<UserQuery>,
) -> AppResult<Json<ActionResponse>> {
    state
        .services
        .shelves
        .remove_book(user.user_id(), &shelf_id, &book_id)
        .await?;
    Ok(Json(ActionResponse::ok("Book removed from shelf")))
}
