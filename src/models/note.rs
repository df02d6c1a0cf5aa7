//! Book note models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(text: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            text,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Create or update note request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NoteRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Note text is required"))]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotesResponse {
    pub notes: Vec<Note>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NoteCreatedResponse {
    pub success: bool,
    pub note: Note,
}

/// Notes of a single visitor, keyed by book id
pub type NotesDocument = HashMap<String, Vec<Note>>;
