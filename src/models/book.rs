//! Book (catalog volume) models
//!
//! These mirror the upstream catalog's volume resource. Field names are kept
//! in the catalog's camelCase on the wire and every field beyond `id` and
//! `title` is optional; nothing here is validated.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{note::Note, reading_list::ReadingStatus, review::Review};

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub etag: Option<String>,
    pub self_link: Option<String>,
    #[serde(default)]
    pub volume_info: VolumeInfo,
    pub sale_info: Option<SaleInfo>,
    pub access_info: Option<AccessInfo>,
    /// Per-visitor annotations, only present on detail lookups
    pub user_info: Option<UserBookInfo>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    #[serde(default)]
    pub title: String,
    pub subtitle: Option<String>,
    pub authors: Option<Vec<String>>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub industry_identifiers: Option<Vec<IndustryIdentifier>>,
    pub page_count: Option<u32>,
    pub print_type: Option<String>,
    pub categories: Option<Vec<String>>,
    pub average_rating: Option<f32>,
    pub ratings_count: Option<u32>,
    pub maturity_rating: Option<String>,
    pub image_links: Option<ImageLinks>,
    pub language: Option<String>,
    pub preview_link: Option<String>,
    pub info_link: Option<String>,
    pub canonical_volume_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IndustryIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub small_thumbnail: Option<String>,
    pub thumbnail: Option<String>,
    pub small: Option<String>,
    pub medium: Option<String>,
    pub large: Option<String>,
    pub extra_large: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub amount: f64,
    pub currency_code: String,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleInfo {
    pub country: Option<String>,
    pub saleability: Option<String>,
    pub is_ebook: Option<bool>,
    pub list_price: Option<Price>,
    pub retail_price: Option<Price>,
    pub buy_link: Option<String>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormatAvailability {
    #[serde(default)]
    pub is_available: bool,
    pub acs_token_link: Option<String>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessInfo {
    pub country: Option<String>,
    pub viewability: Option<String>,
    pub embeddable: Option<bool>,
    pub public_domain: Option<bool>,
    pub text_to_speech_permission: Option<String>,
    pub epub: Option<FormatAvailability>,
    pub pdf: Option<FormatAvailability>,
    pub web_reader_link: Option<String>,
    pub access_view_status: Option<String>,
}

/// What the current visitor has recorded about a book
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBookInfo {
    pub is_favorite: Option<bool>,
    pub in_reading_list: Option<bool>,
    pub reading_status: Option<ReadingStatus>,
    pub notes: Option<Vec<Note>>,
    pub review: Option<Review>,
}

impl UserBookInfo {
    pub fn is_empty(&self) -> bool {
        self == &UserBookInfo::default()
    }
}

/// Catalog search response
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    #[serde(default)]
    pub items: Vec<Book>,
    #[serde(default)]
    pub total_items: u64,
}

impl Book {
    pub fn first_author(&self) -> Option<&str> {
        self.volume_info
            .authors
            .as_ref()
            .and_then(|a| a.first())
            .map(String::as_str)
    }

    pub fn first_category(&self) -> Option<&str> {
        self.volume_info
            .categories
            .as_ref()
            .and_then(|c| c.first())
            .map(String::as_str)
    }
}
