//! Book reviews service

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::review::{Review, ReviewsDocument},
    repository::{Repository, REVIEWS},
};

#[derive(Clone)]
pub struct ReviewsService {
    repository: Repository,
}

impl ReviewsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get(&self, user_id: &str, book_id: &str) -> AppResult<Option<Review>> {
        let mut doc: ReviewsDocument = self.repository.load_or_default(REVIEWS, user_id).await?;
        Ok(doc.remove(book_id))
    }

    /// Create or replace the visitor's review; returns the review and
    /// whether it is new
    pub async fn save(&self, user_id: &str, book_id: &str, rating: u8, text: String) -> AppResult<(Review, bool)> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::Validation("Rating must be between 1 and 5".to_string()));
        }

        self.repository
            .update(REVIEWS, user_id, |doc: &mut ReviewsDocument| {
                let now = Utc::now();
                let previous = doc.get(book_id).map(|r| r.created_at);
                let review = Review {
                    rating,
                    text,
                    created_at: previous.unwrap_or(now),
                    updated_at: now,
                };
                doc.insert(book_id.to_string(), review.clone());
                Ok((review, previous.is_none()))
            })
            .await
    }

    pub async fn delete(&self, user_id: &str, book_id: &str) -> AppResult<()> {
        self.repository
            .update(REVIEWS, user_id, |doc: &mut ReviewsDocument| {
                doc.remove(book_id)
                    .map(|_| ())
                    .ok_or_else(|| AppError::NotFound("Review not found".to_string()))
            })
            .await
    }
}
