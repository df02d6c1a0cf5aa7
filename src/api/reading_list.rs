//! Reading list endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        reading_list::{AddToReadingList, ReadingListResponse, UpdateReadingStatus},
        user::{resolve_user_id, UserQuery},
        ActionResponse,
    },
};

/// List a visitor's reading list
#[utoipa::path(
    get,
    path = "/reading-list",
    tag = "reading-list",
    params(UserQuery),
    responses((status = 200, description = "Reading list", body = ReadingListResponse))
)]
pub async fn list_reading_list(
    State(state): State<crate::AppState>,
    Query(user): Query<UserQuery>,
) -> AppResult<Json<ReadingListResponse>> {
    let items = state.services.reading_list.list(user.user_id()).await?;
    Ok(Json(ReadingListResponse { items }))
}

/// Add a book to the reading list
#[utoipa::path(
    post,
    path = "/reading-list",
    tag = "reading-list",
    request_body = AddToReadingList,
    responses(
        (status = 200, description = "Book added", body = ActionResponse),
        (status = 400, description = "Missing book id", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_to_reading_list(
    State(state): State<crate::AppState>,
    Json(request): Json<AddToReadingList>,
) -> AppResult<Json<ActionResponse>> {
    request.validate()?;

    let user_id = resolve_user_id(request.user_id.as_deref());
    state
        .services
        .reading_list
        .add(user_id, &request.book_id, request.book_info, request.status)
        .await?;
    Ok(Json(ActionResponse::ok("Book added to reading list")))
}

/// Update reading status or progress
#[utoipa::path(
    put,
    path = "/reading-list/{book_id}",
    tag = "reading-list",
    params(("book_id" = String, Path, description = "Catalog volume ID")),
    request_body = UpdateReadingStatus,
    responses(
        (status = 200, description = "Entry updated", body = ActionResponse),
        (status = 404, description = "Book not in reading list", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_reading_status(
    State(state): State<crate::AppState>,
    Path(book_id): Path<String>,
    Json(request): Json<UpdateReadingStatus>,
) -> AppResult<Json<ActionResponse>> {
    request.validate()?;

    let user_id = resolve_user_id(request.user_id.as_deref());
    state
        .services
        .reading_list
        .update(user_id, &book_id, request.status, request.progress)
        .await?;
    Ok(Json(ActionResponse::ok("Reading status updated")))
}

/// Remove a book from the reading list
#[utoipa::path(
    delete,
    path = "/reading-list/{book_id}",
    tag = "reading-list",
    params(("book_id" = String, Path, description = "Catalog volume ID"), UserQuery),
    responses(
        (status = 200, description = "Book removed", body = ActionResponse),
        (status = 404, description = "Book not in reading list", body = crate::error::ErrorResponse)
    )
)]
pub async fn remove_from_reading_list(
    State(state): State<crate::AppState>,
    Path(book_id): Path<String>,
    Query(user): Query<UserQuery>,
) -> AppResult<Json<ActionResponse>> {
    state.services.reading_list.remove(user.user_id(), &book_id).await?;
    Ok(Json(ActionResponse::ok("Book removed from reading list")))
}
