//! Local bookshelf store
//!
//! Shelves of visitors that are not signed in to the catalog. Each visitor
//! starts with the default shelves; custom shelves can be added, renamed
//! and deleted. A shelf holds each book at most once.

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        shelf::{is_default_shelf, ShelfDocument, ShelfRef, StoredShelf},
        Book, Shelf, ShelfBook,
    },
    repository::{Repository, SHELVES},
};

/// Outcome of adding a book to a shelf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

#[derive(Clone)]
pub struct ShelvesService {
    repository: Repository,
}

impl ShelvesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    async fn document(&self, user_id: &str) -> AppResult<ShelfDocument> {
        let mut doc: ShelfDocument = self.repository.load_or_default(SHELVES, user_id).await?;
        doc.ensure_defaults();
        Ok(doc)
    }

    /// List shelves with their book counts
    pub async fn list(&self, user_id: &str) -> AppResult<Vec<Shelf>> {
        Ok(self.document(user_id).await?.summaries())
    }

    /// Create a custom shelf
    pub async fn create(&self, user_id: &str, name: &str) -> AppResult<Shelf> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Shelf name is required".to_string()));
        }

        let shelf = self
            .repository
            .update(SHELVES, user_id, |doc: &mut ShelfDocument| {
                doc.ensure_defaults();
                let id = doc.next_custom_id();
                doc.shelves.insert(
                    id.clone(),
                    StoredShelf {
                        name: name.clone(),
                        books: Default::default(),
                    },
                );
                Ok(Shelf {
                    id,
                    name,
                    book_count: 0,
                })
            })
            .await?;

        tracing::info!(user_id, shelf_id = %shelf.id, "Created bookshelf");
        Ok(shelf)
    }

    /// Rename a custom shelf
    pub async fn rename(&self, user_id: &str, shelf_id: &str, name: &str) -> AppResult<()> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Shelf name is required".to_string()));
        }

        self.repository
            .update(SHELVES, user_id, |doc: &mut ShelfDocument| {
                doc.ensure_defaults();
                let shelf = doc
                    .shelves
                    .get_mut(shelf_id)
                    .ok_or_else(|| AppError::ShelfNotFound(shelf_id.to_string()))?;
                if is_default_shelf(shelf_id) {
                    return Err(AppError::Forbidden(
                        "Cannot rename default bookshelves".to_string(),
                    ));
                }
                shelf.name = name;
                Ok(())
            })
            .await
    }

    /// Delete a custom shelf and its entries
    pub async fn delete(&self, user_id: &str, shelf_id: &str) -> AppResult<()> {
        self.repository
            .update(SHELVES, user_id, |doc: &mut ShelfDocument| {
                doc.ensure_defaults();
                if !doc.shelves.contains_key(shelf_id) {
                    return Err(AppError::ShelfNotFound(shelf_id.to_string()));
                }
                if is_default_shelf(shelf_id) {
                    return Err(AppError::Forbidden(
                        "Cannot delete default bookshelves".to_string(),
                    ));
                }
                doc.shelves.shift_remove(shelf_id);
                Ok(())
            })
            .await?;

        tracing::info!(user_id, shelf_id, "Deleted bookshelf");
        Ok(())
    }

    /// Books on a shelf, oldest first
    pub async fn books(&self, user_id: &str, shelf_id: &str) -> AppResult<(ShelfRef, Vec<ShelfBook>)> {
        let doc = self.document(user_id).await?;
        let shelf = doc
            .shelves
            .get(shelf_id)
            .ok_or_else(|| AppError::ShelfNotFound(shelf_id.to_string()))?;

        Ok((
            ShelfRef {
                id: shelf_id.to_string(),
                name: shelf.name.clone(),
            },
            shelf.books.values().cloned().collect(),
        ))
    }

    /// Put a book on a shelf.
    ///
    /// Adding a book that is already on the shelf keeps the existing entry
    /// and its original `addedAt`.
    pub async fn add_book(
        &self,
        user_id: &str,
        shelf_id: &str,
        book: Book,
        added_at: Option<DateTime<Utc>>,
    ) -> AppResult<AddOutcome> {
        if book.id.trim().is_empty() {
            return Err(AppError::Validation("Book ID is required".to_string()));
        }

        let outcome = self
            .repository
            .update(SHELVES, user_id, |doc: &mut ShelfDocument| {
                doc.ensure_defaults();
                let shelf = doc
                    .shelves
                    .get_mut(shelf_id)
                    .ok_or_else(|| AppError::ShelfNotFound(shelf_id.to_string()))?;
                if shelf.books.contains_key(&book.id) {
                    return Ok(AddOutcome::AlreadyPresent);
                }
                shelf.books.insert(
                    book.id.clone(),
                    ShelfBook {
                        id: book.id.clone(),
                        added_at: added_at.unwrap_or_else(Utc::now),
                        volume_info: book.volume_info,
                    },
                );
                Ok(AddOutcome::Added)
            })
            .await?;

        tracing::debug!(user_id, shelf_id, ?outcome, "Add book to shelf");
        Ok(outcome)
    }

    /// Take a book off a shelf
    pub async fn remove_book(&self, user_id: &str, shelf_id: &str, book_id: &str) -> AppResult<()> {
        self.repository
            .update(SHELVES, user_id, |doc: &mut ShelfDocument| {
                doc.ensure_defaults();
                let shelf = doc
                    .shelves
                    .get_mut(shelf_id)
                    .ok_or_else(|| AppError::ShelfNotFound(shelf_id.to_string()))?;
                shelf
                    .books
                    .shift_remove(book_id)
                    .map(|_| ())
                    .ok_or_else(|| AppError::NotFound("Book not found in shelf".to_string()))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VolumeInfo;

    fn service() -> ShelvesService {
        ShelvesService::new(Repository::in_memory())
    }

    fn book(id: &str) -> Book {
        Book {
            id: id.to_string(),
            volume_info: VolumeInfo {
                title: format!("Book {}", id),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_new_visitor_gets_default_shelves() {
        let shelves = service().list("anon-1").await.unwrap();
        assert_eq!(shelves.len(), 5);
        assert!(shelves.iter().all(|s| s.book_count == 0));
        assert_eq!(shelves[2].name, "To Read");
    }

    #[tokio::test]
    async fn test_add_then_list_once() {
        let service = service();
        let first = service.add_book("anon-1", "2", book("b1"), None).await.unwrap();
        assert_eq!(first, AddOutcome::Added);
        let (_, books) = service.books("anon-1", "2").await.unwrap();
        let added_at = books[0].added_at;

        let second = service.add_book("anon-1", "2", book("b1"), None).await.unwrap();
        assert_eq!(second, AddOutcome::AlreadyPresent);

        let (shelf, books) = service.books("anon-1", "2").await.unwrap();
        assert_eq!(shelf.name, "To Read");
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].added_at, added_at);

        let shelves = service.list("anon-1").await.unwrap();
        assert_eq!(shelves[2].book_count, 1);
    }

    #[tokio::test]
    async fn test_client_stamp_is_kept() {
        let service = service();
        let stamp = DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        service
            .add_book("anon-1", "0", book("b1"), Some(stamp))
            .await
            .unwrap();
        let (_, books) = service.books("anon-1", "0").await.unwrap();
        assert_eq!(books[0].added_at, stamp);
    }

    #[tokio::test]
    async fn test_remove_then_list() {
        let service = service();
        service.add_book("anon-1", "2", book("b1"), None).await.unwrap();
        service.add_book("anon-1", "2", book("b2"), None).await.unwrap();
        service.remove_book("anon-1", "2", "b1").await.unwrap();

        let (_, books) = service.books("anon-1", "2").await.unwrap();
        let ids: Vec<_> = books.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b2"]);

        assert!(matches!(
            service.remove_book("anon-1", "2", "b1").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_shelf() {
        let service = service();
        assert!(matches!(
            service.books("anon-1", "missing-shelf").await,
            Err(AppError::ShelfNotFound(_))
        ));
        assert!(matches!(
            service.add_book("anon-1", "missing-shelf", book("b1"), None).await,
            Err(AppError::ShelfNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_custom_shelf_lifecycle() {
        let service = service();
        let shelf = service.create("anon-1", " Sci-fi ").await.unwrap();
        assert_eq!(shelf.id, "1001");
        assert_eq!(shelf.name, "Sci-fi");
        assert_eq!(service.create("anon-1", "Poetry").await.unwrap().id, "1002");

        service.rename("anon-1", "1001", "Science fiction").await.unwrap();
        let shelves = service.list("anon-1").await.unwrap();
        assert_eq!(shelves.len(), 7);
        assert_eq!(shelves[5].name, "Science fiction");

        service.delete("anon-1", "1001").await.unwrap();
        assert!(matches!(
            service.delete("anon-1", "1001").await,
            Err(AppError::ShelfNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_default_shelves_are_protected() {
        let service = service();
        assert!(matches!(
            service.rename("anon-1", "0", "Mine").await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            service.delete("anon-1", "4").await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            service.create("anon-1", "   ").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_visitors_are_isolated() {
        let service = service();
        service.add_book("anon-1", "0", book("b1"), None).await.unwrap();
        let (_, books) = service.books("anon-2", "0").await.unwrap();
        assert!(books.is_empty());
    }
}
