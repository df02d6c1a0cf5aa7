//! Book notes service

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::note::{Note, NotesDocument},
    repository::{Repository, NOTES},
};

#[derive(Clone)]
pub struct NotesService {
    repository: Repository,
}

fn require_text(text: &str) -> AppResult<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Note text is required".to_string()));
    }
    Ok(text.to_string())
}

impl NotesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, user_id: &str, book_id: &str) -> AppResult<Vec<Note>> {
        let mut doc: NotesDocument = self.repository.load_or_default(NOTES, user_id).await?;
        Ok(doc.remove(book_id).unwrap_or_default())
    }

    pub async fn add(&self, user_id: &str, book_id: &str, text: &str) -> AppResult<Note> {
        let note = Note::new(require_text(text)?);
        let created = note.clone();
        self.repository
            .update(NOTES, user_id, |doc: &mut NotesDocument| {
                doc.entry(book_id.to_string()).or_default().push(note);
                Ok(())
            })
            .await?;
        Ok(created)
    }

    pub async fn update(&self, user_id: &str, book_id: &str, note_id: Uuid, text: &str) -> AppResult<Note> {
        let text = require_text(text)?;
        self.repository
            .update(NOTES, user_id, |doc: &mut NotesDocument| {
                let note = doc
                    .get_mut(book_id)
                    .and_then(|notes| notes.iter_mut().find(|n| n.id == note_id))
                    .ok_or_else(|| AppError::NotFound("Note not found".to_string()))?;
                note.text = text;
                note.updated_at = Utc::now();
                Ok(note.clone())
            })
            .await
    }

    pub async fn delete(&self, user_id: &str, book_id: &str, note_id: Uuid) -> AppResult<()> {
        self.repository
            .update(NOTES, user_id, |doc: &mut NotesDocument| {
                let notes = doc
                    .get_mut(book_id)
                    .ok_or_else(|| AppError::NotFound("Note not found".to_string()))?;
                let before = notes.len();
                notes.retain(|n| n.id != note_id);
                if notes.len() == before {
                    return Err(AppError::NotFound("Note not found".to_string()));
                }
                if notes.is_empty() {
                    doc.remove(book_id);
                }
                Ok(())
            })
            .await
    }
}
