//! Book note endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        note::{Note, NoteCreatedResponse, NoteRequest, NotesResponse},
        user::{resolve_user_id, UserQuery},
        ActionResponse,
    },
};

/// Notes a visitor wrote about a book
#[utoipa::path(
    get,
    path = "/notes/{book_id}",
    tag = "notes",
    params(("book_id" = String, Path, description = "Catalog volume ID"), UserQuery),
    responses((status = 200, description = "Notes, oldest first", body = NotesResponse))
)]
pub async fn list_notes(
    State(state): State<crate::AppState>,
    Path(book_id): Path<String>,
    Query(user): Query<UserQuery>,
) -> AppResult<Json<NotesResponse>> {
    let notes = state.services.notes.list(user.user_id(), &book_id).await?;
    Ok(Json(NotesResponse { notes }))
}

/// Write a note
#[utoipa::path(
    post,
    path = "/notes/{book_id}",
    tag = "notes",
    params(("book_id" = String, Path, description = "Catalog volume ID")),
    request_body = NoteRequest,
    responses(
        (status = 201, description = "Note created", body = NoteCreatedResponse),
        (status = 400, description = "Empty note", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_note(
    State(state): State<crate::AppState>,
    Path(book_id): Path<String>,
    Json(request): Json<NoteRequest>,
) -> AppResult<(StatusCode, Json<NoteCreatedResponse>)> {
    request.validate()?;

    let user_id = resolve_user_id(request.user_id.as_deref());
    let note = state.services.notes.add(user_id, &book_id, &request.text).await?;
    Ok((
        StatusCode::CREATED,
        Json(NoteCreatedResponse { success: true, note }),
    ))
}

/// Edit a note
#[utoipa::path(
    put,
    path = "/notes/{book_id}/{note_id}",
    tag = "notes",
    params(
        ("book_id" = String, Path, description = "Catalog volume ID"),
        ("note_id" = Uuid, Path, description = "Note ID")
    ),
    request_body = NoteRequest,
    responses(
        (status = 200, description = "Note updated", body = Note),
        (status = 404, description = "Note not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_note(
    State(state): State<crate::AppState>,
    Path((book_id, note_id)): Path<(String, Uuid)>,
    Json(request): Json<NoteRequest>,
) -> AppResult<Json<Note>> {
    request.validate()?;

    let user_id = resolve_user_id(request.user_id.as_deref());
    let note = state
        .services
        .notes
        .update(user_id, &book_id, note_id, &request.text)
        .await?;
    Ok(Json(note))
}

/// Delete a note
#[utoipa::path(
    delete,
    path = "/notes/{book_id}/{note_id}",
    tag = "notes",
    params(
        ("book_id" = String, Path, description = "Catalog volume ID"),
        ("note_id" = Uuid, Path, description = "Note ID"),
        UserQuery
    ),
    responses(
        (status = 200, description = "Note deleted", body = ActionResponse),
        (status = 404, description = "Note not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_note(
    State(state): State<crate::AppState>,
    Path((book_id, note_id)): Path<(String, Uuid)>,
    Query(user): Query<UserQuery>,
) -> AppResult<Json<ActionResponse>> {
    state.services.notes.delete(user.user_id(), &book_id, note_id).await?;
    Ok(Json(ActionResponse::ok("Note deleted")))
}
