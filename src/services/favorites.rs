//! Favorites service

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        favorite::{FavoriteBook, FavoritesDocument},
        VolumeInfo,
    },
    repository::{Repository, FAVORITES},
};

#[derive(Clone)]
pub struct FavoritesService {
    repository: Repository,
}

impl FavoritesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, user_id: &str) -> AppResult<Vec<FavoriteBook>> {
        let doc: FavoritesDocument = self.repository.load_or_default(FAVORITES, user_id).await?;
        Ok(doc.into_values().collect())
    }

    pub async fn contains(&self, user_id: &str, book_id: &str) -> AppResult<bool> {
        let doc: FavoritesDocument = self.repository.load_or_default(FAVORITES, user_id).await?;
        Ok(doc.contains_key(book_id))
    }

    /// Mark a book as favorite, refreshing its stored details
    pub async fn add(&self, user_id: &str, book_id: &str, volume_info: VolumeInfo) -> AppResult<()> {
        self.repository
            .update(FAVORITES, user_id, |doc: &mut FavoritesDocument| {
                doc.insert(
                    book_id.to_string(),
                    FavoriteBook {
                        id: book_id.to_string(),
                        added_at: Utc::now(),
                        volume_info,
                    },
                );
                Ok(())
            })
            .await
    }

    pub async fn remove(&self, user_id: &str, book_id: &str) -> AppResult<()> {
        self.repository
            .update(FAVORITES, user_id, |doc: &mut FavoritesDocument| {
                doc.shift_remove(book_id)
                    .map(|_| ())
                    .ok_or_else(|| AppError::NotFound("Book not found in favorites".to_string()))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_favorites() {
        let service = FavoritesService::new(Repository::in_memory());
        service.add("u", "b1", VolumeInfo::default()).await.unwrap();
        service.add("u", "b2", VolumeInfo::default()).await.unwrap();
        assert!(service.contains("u", "b1").await.unwrap());

        service.remove("u", "b1").await.unwrap();
        let ids: Vec<_> = service.list("u").await.unwrap().into_iter().map(|f| f.id).collect();
        assert_eq!(ids, vec!["b2"]);

        assert!(matches!(service.remove("u", "b1").await, Err(AppError::NotFound(_))));
    }
}
