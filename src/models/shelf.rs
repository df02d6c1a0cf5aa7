//! Bookshelf models

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::book::{Book, VolumeInfo};

/// Shelves every visitor starts with. These can be filled but never renamed
/// or deleted.
pub const DEFAULT_SHELVES: [(&str, &str); 5] = [
    ("0", "Favorites"),
    ("1", "Purchased"),
    ("2", "To Read"),
    ("3", "Reading Now"),
    ("4", "Have Read"),
];

/// Custom shelves are numbered above this value.
pub const CUSTOM_SHELF_BASE_ID: u64 = 1000;

/// Shelf summary with derived book count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shelf {
    pub id: String,
    pub name: String,
    pub book_count: usize,
}

/// Book stored on a shelf, in the shape shared by both shelf backends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShelfBook {
    pub id: String,
    pub added_at: DateTime<Utc>,
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShelfRef {
    pub id: String,
    pub name: String,
}

/// Create shelf request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateShelf {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Shelf name is required"))]
    pub name: String,
}

/// Rename shelf request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RenameShelf {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Shelf name is required"))]
    pub name: String,
}

/// Add a book to a local shelf.
///
/// `addedAt` may be stamped by the client; the server stamps the current
/// time when it is missing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddShelfBook {
    #[serde(default, rename = "user_id", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub book: Book,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShelvesResponse {
    pub shelves: Vec<Shelf>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateShelfResponse {
    pub success: bool,
    pub shelf: Shelf,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShelfBooksResponse {
    pub shelf: ShelfRef,
    pub books: Vec<ShelfBook>,
}

/// Shelves of an authenticated catalog library
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LibraryShelvesResponse {
    #[serde(default)]
    pub items: Vec<Shelf>,
}

/// Persisted shelf state of a single visitor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShelfDocument {
    pub shelves: IndexMap<String, StoredShelf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredShelf {
    pub name: String,
    #[serde(default)]
    pub books: IndexMap<String, ShelfBook>,
}

impl StoredShelf {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            books: IndexMap::new(),
        }
    }
}

pub fn is_default_shelf(shelf_id: &str) -> bool {
    DEFAULT_SHELVES.iter().any(|(id, _)| *id == shelf_id)
}

impl ShelfDocument {
    /// Document with only the default shelves
    pub fn with_defaults() -> Self {
        let mut doc = Self::default();
        doc.ensure_defaults();
        doc
    }

    /// Materialize the default shelves if this visitor has none yet
    pub fn ensure_defaults(&mut self) {
        if self.shelves.is_empty() {
            for (id, name) in DEFAULT_SHELVES {
                self.shelves.insert(id.to_string(), StoredShelf::empty(name));
            }
        }
    }

    pub fn summaries(&self) -> Vec<Shelf> {
        self.shelves
            .iter()
            .map(|(id, shelf)| Shelf {
                id: id.clone(),
                name: shelf.name.clone(),
                book_count: shelf.books.len(),
            })
            .collect()
    }

    /// Next free custom shelf id (first one is 1001)
    pub fn next_custom_id(&self) -> String {
        let max = self
            .shelves
            .keys()
            .filter_map(|id| id.parse::<u64>().ok())
            .filter(|id| *id >= CUSTOM_SHELF_BASE_ID)
            .max()
            .unwrap_or(CUSTOM_SHELF_BASE_ID);
        (max + 1).to_string()
    }
}
