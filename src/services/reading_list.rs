//! Reading list service

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        reading_list::{ReadingListBook, ReadingListDocument},
        ReadingStatus, VolumeInfo,
    },
    repository::{Repository, READING_LIST},
};

#[derive(Clone)]
pub struct ReadingListService {
    repository: Repository,
}

impl ReadingListService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, user_id: &str) -> AppResult<Vec<ReadingListBook>> {
        let doc: ReadingListDocument = self.repository.load_or_default(READING_LIST, user_id).await?;
        Ok(doc.into_values().collect())
    }

    pub async fn get(&self, user_id: &str, book_id: &str) -> AppResult<Option<ReadingListBook>> {
        let mut doc: ReadingListDocument = self.repository.load_or_default(READING_LIST, user_id).await?;
        Ok(doc.shift_remove(book_id))
    }

    /// Add a book, resetting progress if it was already listed
    pub async fn add(
        &self,
        user_id: &str,
        book_id: &str,
        volume_info: VolumeInfo,
        status: ReadingStatus,
    ) -> AppResult<()> {
        self.repository
            .update(READING_LIST, user_id, |doc: &mut ReadingListDocument| {
                doc.insert(
                    book_id.to_string(),
                    ReadingListBook {
                        id: book_id.to_string(),
                        added_at: Utc::now(),
                        status,
                        progress: 0,
                        volume_info,
                    },
                );
                Ok(())
            })
            .await
    }

    pub async fn update(
        &self,
        user_id: &str,
        book_id: &str,
        status: Option<ReadingStatus>,
        progress: Option<u8>,
    ) -> AppResult<()> {
        self.repository
            .update(READING_LIST, user_id, |doc: &mut ReadingListDocument| {
                let entry = doc
                    .get_mut(book_id)
                    .ok_or_else(|| AppError::NotFound("Book not found in reading list".to_string()))?;
                if let Some(status) = status {
                    entry.status = status;
                }
                if let Some(progress) = progress {
                    entry.progress = progress.min(100);
                }
                Ok(())
            })
            .await
    }

    pub async fn remove(&self, user_id: &str, book_id: &str) -> AppResult<()> {
        self.repository
            .update(READING_LIST, user_id, |doc: &mut ReadingListDocument| {
                doc.shift_remove(book_id)
                    .map(|_| ())
                    .ok_or_else(|| AppError::NotFound("Book not found in reading list".to_string()))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reading_progress() {
        let service = ReadingListService::new(Repository::in_memory());
        service
            .add("u", "b1", VolumeInfo::default(), ReadingStatus::ToRead)
            .await
            .unwrap();
        service
            .update("u", "b1", Some(ReadingStatus::Reading), Some(40))
            .await
            .unwrap();

        let entry = service.get("u", "b1").await.unwrap().unwrap();
        assert_eq!(entry.status, ReadingStatus::Reading);
        assert_eq!(entry.progress, 40);

        service.update("u", "b1", None, Some(250)).await.unwrap();
        let entry = service.get("u", "b1").await.unwrap().unwrap();
        assert_eq!(entry.status, ReadingStatus::Reading);
        assert_eq!(entry.progress, 100);
    }

    #[tokio::test]
    async fn test_update_unknown_book() {
        let service = ReadingListService::new(Repository::in_memory());
        assert!(matches!(
            service.update("u", "nope", Some(ReadingStatus::Finished), None).await,
            Err(AppError::NotFound(_))
        ));
    }
}
