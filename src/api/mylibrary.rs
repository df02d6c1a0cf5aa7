//! Authenticated catalog library endpoints
//!
//! Thin proxies to the catalog's per-user bookshelves. The caller's bearer
//! token is forwarded as is; the catalog decides whose library it is.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::{shelf::LibraryShelvesResponse, ActionResponse, SearchResults},
};

use super::LibraryToken;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct VolumeQuery {
    pub volume_id: String,
}

/// Shelves of the signed-in user
#[utoipa::path(
    get,
    path = "/mylibrary/bookshelves",
    tag = "mylibrary",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Library shelves", body = LibraryShelvesResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_shelves(
    State(state): State<crate::AppState>,
    LibraryToken(token): LibraryToken,
) -> AppResult<Json<LibraryShelvesResponse>> {
    let items = state.services.catalog.library_shelves(&token).await?;
    Ok(Json(LibraryShelvesResponse { items }))
}

/// Add a volume to a library shelf
#[utoipa::path(
    post,
    path = "/mylibrary/bookshelves/{shelf_id}/addVolume",
    tag = "mylibrary",
    security(("bearer_auth" = [])),
    params(("shelf_id" = String, Path, description = "Library shelf ID"), VolumeQuery),
    responses(
        (status = 200, description = "Volume added", body = ActionResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_volume(
    State(state): State<crate::AppState>,
    LibraryToken(token): LibraryToken,
    Path(shelf_id): Path<String>,
    Query(query): Query<VolumeQuery>,
) -> AppResult<Json<ActionResponse>> {
    state
        .services
        .catalog
        .library_add_volume(&token, &shelf_id, &query.volume_id)
        .await?;
    Ok(Json(ActionResponse::ok("Book added to shelf")))
}

/// Remove a volume from a library shelf
#[utoipa::path(
    post,
    path = "/mylibrary/bookshelves/{shelf_id}/removeVolume",
    tag = "mylibrary",
    security(("bearer_auth" = [])),
    params(("shelf_id" = String, Path, description = "Library shelf ID"), VolumeQuery),
    responses(
        (status = 200, description = "Volume removed", body = ActionResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn remove_volume(
    State(state): State<crate::AppState>,
    LibraryToken(token): LibraryToken,
    Path(shelf_id): Path<String>,
    Query(query): Query<VolumeQuery>,
) -> AppResult<Json<ActionResponse>> {
    state
        .services
        .catalog
        .library_remove_volume(&token, &shelf_id, &query.volume_id)
        .await?;
    Ok(Json(ActionResponse::ok("Book removed from shelf")))
}

/// Volumes on a library shelf
#[utoipa::path(
    get,
    path = "/mylibrary/bookshelves/{shelf_id}/volumes",
    tag = "mylibrary",
    security(("bearer_auth" = [])),
    params(("shelf_id" = String, Path, description = "Library shelf ID")),
    responses(
        (status = 200, description = "Volumes on the shelf", body = SearchResults),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_volumes(
    State(state): State<crate::AppState>,
    LibraryToken(token): LibraryToken,
    Path(shelf_id): Path<String>,
) -> AppResult<Json<SearchResults>> {
    let volumes = state.services.catalog.library_volumes(&token, &shelf_id).await?;
    Ok(Json(volumes))
}
