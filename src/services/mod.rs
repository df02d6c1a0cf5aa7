//! Business logic services

pub mod auth;
pub mod catalog;
pub mod favorites;
pub mod notes;
pub mod reading_list;
pub mod reviews;
pub mod shelves;

use crate::{config::AppConfig, error::AppResult, models::UserBookInfo, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub shelves: shelves::ShelvesService,
    pub favorites: favorites::FavoritesService,
    pub reading_list: reading_list::ReadingListService,
    pub notes: notes::NotesService,
    pub reviews: reviews::ReviewsService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(config: &AppConfig, repository: Repository) -> AppResult<Self> {
        Ok(Self {
            auth: auth::AuthService::new(config.auth.clone(), config.catalog.timeout_secs)?,
            catalog: catalog::CatalogService::new(config.catalog.clone())?,
            shelves: shelves::ShelvesService::new(repository.clone()),
            favorites: favorites::FavoritesService::new(repository.clone()),
            reading_list: reading_list::ReadingListService::new(repository.clone()),
            notes: notes::NotesService::new(repository.clone()),
            reviews: reviews::ReviewsService::new(repository.clone()),
            repository,
        })
    }

    /// Everything a visitor recorded about a book, `None` when nothing was
    pub async fn user_book_info(&self, user_id: &str, book_id: &str) -> AppResult<Option<UserBookInfo>> {
        let mut info = UserBookInfo::default();

        if self.favorites.contains(user_id, book_id).await? {
            info.is_favorite = Some(true);
        }
        if let Some(entry) = self.reading_list.get(user_id, book_id).await? {
            info.in_reading_list = Some(true);
            info.reading_status = Some(entry.status);
        }
        let notes = self.notes.list(user_id, book_id).await?;
        if !notes.is_empty() {
            info.notes = Some(notes);
        }
        info.review = self.reviews.get(user_id, book_id).await?;

        Ok((!info.is_empty()).then_some(info))
    }
}
