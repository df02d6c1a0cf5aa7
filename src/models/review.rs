//! Book review models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub rating: u8,
    #[serde(default)]
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create or replace review request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReviewRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[validate(
        required(message = "Rating is required"),
        range(min = 1, max = 5, message = "Rating must be between 1 and 5")
    )]
    pub rating: Option<u8>,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewResponse {
    pub review: Option<Review>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewSavedResponse {
    pub success: bool,
    pub message: String,
    pub review: Review,
}

/// Reviews of a single visitor, keyed by book id
pub type ReviewsDocument = HashMap<String, Review>;
