//! Book review endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        review::{ReviewRequest, ReviewResponse, ReviewSavedResponse},
        user::{resolve_user_id, UserQuery},
        ActionResponse,
    },
};

/// A visitor's review of a book
#[utoipa::path(
    get,
    path = "/reviews/{book_id}",
    tag = "reviews",
    params(("book_id" = String, Path, description = "Catalog volume ID"), UserQuery),
    responses((status = 200, description = "The review, if any", body = ReviewResponse))
)]
pub async fn get_review(
    State(state): State<crate::AppState>,
    Path(book_id): Path<String>,
    Query(user): Query<UserQuery>,
) -> AppResult<Json<ReviewResponse>> {
    let review = state.services.reviews.get(user.user_id(), &book_id).await?;
    Ok(Json(ReviewResponse { review }))
}

/// Create or replace a review
#[utoipa::path(
    post,
    path = "/reviews/{book_id}",
    tag = "reviews",
    params(("book_id" = String, Path, description = "Catalog volume ID")),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewSavedResponse),
        (status = 200, description = "Review replaced", body = ReviewSavedResponse),
        (status = 400, description = "Rating missing or out of range", body = crate::error::ErrorResponse)
    )
)]
pub async fn save_review(
    State(state): State<crate::AppState>,
    Path(book_id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> AppResult<(StatusCode, Json<ReviewSavedResponse>)> {
    request.validate()?;

    let rating = request
        .rating
        .ok_or_else(|| AppError::Validation("Rating is required".to_string()))?;
    let user_id = resolve_user_id(request.user_id.as_deref());
    let (review, created) = state
        .services
        .reviews
        .save(user_id, &book_id, rating, request.text)
        .await?;

    let (status, message) = if created {
        (StatusCode::CREATED, "Review created")
    } else {
        (StatusCode::OK, "Review updated")
    };
    Ok((
        status,
        Json(ReviewSavedResponse {
            success: true,
            message: message.to_string(),
            review,
        }),
    ))
}

/// Delete a review
#[utoipa::path(
    delete,
    path = "/reviews/{book_id}",
    tag = "reviews",
    params(("book_id" = String, Path, description = "Catalog volume ID"), UserQuery),
    responses(
        (status = 200, description = "Review deleted", body = ActionResponse),
        (status = 404, description = "No review for this book", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_review(
    State(state): State<crate::AppState>,
    Path(book_id): Path<String>,
    Query(user): Query<UserQuery>,
) -> AppResult<Json<ActionResponse>> {
    state.services.reviews.delete(user.user_id(), &book_id).await?;
    Ok(Json(ActionResponse::ok("Review deleted")))
}
