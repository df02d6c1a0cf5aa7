//! Reading list models

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::book::VolumeInfo;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingStatus {
    #[default]
    ToRead,
    Reading,
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadingListBook {
    pub id: String,
    pub added_at: DateTime<Utc>,
    pub status: ReadingStatus,
    /// Percentage read
    pub progress: u8,
    pub volume_info: VolumeInfo,
}

/// Add to reading list request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddToReadingList {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Book ID is required"))]
    pub book_id: String,
    #[serde(default, rename = "bookInfo")]
    pub book_info: VolumeInfo,
    #[serde(default)]
    pub status: ReadingStatus,
}

/// Update reading status request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateReadingStatus {
    #[serde(default)]
    pub user_id: Option<String>,
    pub status: Option<ReadingStatus>,
    #[validate(range(max = 100, message = "Progress must be between 0 and 100"))]
    pub progress: Option<u8>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadingListResponse {
    pub items: Vec<ReadingListBook>,
}

pub type ReadingListDocument = IndexMap<String, ReadingListBook>;
