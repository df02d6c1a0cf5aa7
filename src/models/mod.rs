//! Data models for BookFinder

pub mod book;
pub mod favorite;
pub mod note;
pub mod reading_list;
pub mod review;
pub mod shelf;
pub mod user;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Re-export commonly used types
pub use book::{Book, SearchResults, UserBookInfo, VolumeInfo};
pub use reading_list::ReadingStatus;
pub use shelf::{Shelf, ShelfBook};
pub use user::{AuthStatus, Identity, UserInfo};

/// Acknowledgement returned by mutating endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
