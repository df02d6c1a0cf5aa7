//! Favorite book models

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::book::VolumeInfo;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteBook {
    pub id: String,
    pub added_at: DateTime<Utc>,
    pub volume_info: VolumeInfo,
}

/// Add favorite request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddFavorite {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Book ID is required"))]
    pub book_id: String,
    #[serde(default, rename = "bookInfo")]
    pub book_info: VolumeInfo,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FavoritesResponse {
    pub items: Vec<FavoriteBook>,
}

/// Favorites of a single visitor, keyed by book id
pub type FavoritesDocument = IndexMap<String, FavoriteBook>;
