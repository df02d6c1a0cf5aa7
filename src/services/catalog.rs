//! External book catalog client
//!
//! Talks to a Google Books compatible API: public volume search and lookup,
//! plus the per-user "my library" bookshelf endpoints that require the
//! visitor's bearer token.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{header::CONTENT_LENGTH, Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;
use utoipa::IntoParams;

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
    models::{Book, SearchResults, Shelf},
};

const DEFAULT_MAX_RESULTS: u32 = 10;
const MAX_RESULTS_LIMIT: u32 = 40;
const RELATED_FETCH: u32 = 6;
const RELATED_LIMIT: usize = 5;

static CATALOG_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("catalog id pattern"));

/// Reject ids that would not form a single path segment upstream
pub fn ensure_catalog_id(kind: &str, id: &str) -> AppResult<()> {
    if CATALOG_ID.is_match(id) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid {} id", kind)))
    }
}

/// Volume search parameters, named as the catalog names them
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Free text query; supports `inauthor:"X"`, `subject:"Y"`, `isbn:N`
    pub q: Option<String>,
    pub start_index: Option<u32>,
    pub max_results: Option<u32>,
    /// `relevance` (default) or `newest`
    pub order_by: Option<String>,
    pub filter: Option<String>,
}

impl SearchParams {
    pub fn query(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            ..Default::default()
        }
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }
}

/// Bookshelf as returned by the catalog's library endpoints
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteBookshelf {
    id: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    volume_count: usize,
}

#[derive(Debug, Deserialize)]
struct RemoteBookshelves {
    #[serde(default)]
    items: Vec<RemoteBookshelf>,
}

impl From<RemoteBookshelf> for Shelf {
    fn from(shelf: RemoteBookshelf) -> Self {
        Shelf {
            id: shelf.id.to_string(),
            name: shelf.title,
            book_count: shelf.volume_count,
        }
    }
}

#[derive(Clone)]
pub struct CatalogService {
    client: Client,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(config: CatalogConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn with_key(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => request.query(&[("key", key)]),
            None => request,
        }
    }

    /// Normalized query string for a volume search
    pub fn search_pairs(params: &SearchParams) -> AppResult<Vec<(&'static str, String)>> {
        let q = params
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::Validation("Query parameter 'q' is required".to_string()))?;

        let order_by = params.order_by.as_deref().unwrap_or("relevance");
        if order_by != "relevance" && order_by != "newest" {
            return Err(AppError::BadRequest(format!(
                "Unsupported orderBy value: {}",
                order_by
            )));
        }

        let max_results = params
            .max_results
            .unwrap_or(DEFAULT_MAX_RESULTS)
            .clamp(1, MAX_RESULTS_LIMIT);

        let mut pairs = vec![
            ("q", q.to_string()),
            ("startIndex", params.start_index.unwrap_or(0).to_string()),
            ("maxResults", max_results.to_string()),
            ("orderBy", order_by.to_string()),
        ];
        if let Some(filter) = params.filter.as_deref().filter(|f| !f.is_empty()) {
            pairs.push(("filter", filter.to_string()));
        }
        Ok(pairs)
    }

    /// Search volumes
    pub async fn search(&self, params: &SearchParams) -> AppResult<SearchResults> {
        let pairs = Self::search_pairs(params)?;
        tracing::debug!(query = %pairs[0].1, "Catalog search");

        let request = self.client.get(self.url("/volumes")).query(&pairs);
        self.fetch_json(self.with_key(request)).await
    }

    /// Fetch a single volume
    pub async fn get_volume(&self, volume_id: &str) -> AppResult<Book> {
        ensure_catalog_id("volume", volume_id)?;
        let request = self.client.get(self.url(&format!("/volumes/{}", volume_id)));
        self.fetch_json(self.with_key(request)).await
    }

    /// Query used to find books related to `book`: first author, else first category
    pub fn related_query(book: &Book) -> Option<String> {
        if let Some(author) = book.first_author() {
            return Some(format!("inauthor:\"{}\"", author));
        }
        book.first_category()
            .map(|category| format!("subject:\"{}\"", category))
    }

    /// Books related to `book`, excluding the book itself
    pub async fn related(&self, book: &Book) -> AppResult<Vec<Book>> {
        let Some(query) = Self::related_query(book) else {
            return Ok(Vec::new());
        };

        let results = self
            .search(&SearchParams::query(query).with_max_results(RELATED_FETCH))
            .await?;

        Ok(results
            .items
            .into_iter()
            .filter(|item| item.id != book.id)
            .take(RELATED_LIMIT)
            .collect())
    }

    /// Shelves of the token owner's catalog library
    pub async fn library_shelves(&self, token: &str) -> AppResult<Vec<Shelf>> {
        let request = self
            .client
            .get(self.url("/mylibrary/bookshelves"))
            .bearer_auth(token);
        let shelves: RemoteBookshelves = self.fetch_json(request).await?;
        Ok(shelves.items.into_iter().map(Shelf::from).collect())
    }

    pub async fn library_add_volume(&self, token: &str, shelf_id: &str, volume_id: &str) -> AppResult<()> {
        ensure_catalog_id("shelf", shelf_id)?;
        ensure_catalog_id("volume", volume_id)?;
        let request = self
            .client
            .post(self.url(&format!("/mylibrary/bookshelves/{}/addVolume", shelf_id)))
            .bearer_auth(token)
            // the catalog answers 411 to body-less POSTs without a length
            .header(CONTENT_LENGTH, 0)
            .query(&[("volumeId", volume_id)]);
        self.send(request).await.map(|_| ())
    }

    pub async fn library_remove_volume(&self, token: &str, shelf_id: &str, volume_id: &str) -> AppResult<()> {
        ensure_catalog_id("shelf", shelf_id)?;
        ensure_catalog_id("volume", volume_id)?;
        let request = self
            .client
            .post(self.url(&format!("/mylibrary/bookshelves/{}/removeVolume", shelf_id)))
            .bearer_auth(token)
            // the catalog answers 411 to body-less POSTs without a length
            .header(CONTENT_LENGTH, 0)
            .query(&[("volumeId", volume_id)]);
        self.send(request).await.map(|_| ())
    }

    pub async fn library_volumes(&self, token: &str, shelf_id: &str) -> AppResult<SearchResults> {
        ensure_catalog_id("shelf", shelf_id)?;
        let request = self
            .client
            .get(self.url(&format!("/mylibrary/bookshelves/{}/volumes", shelf_id)))
            .bearer_auth(token);
        self.fetch_json(request).await
    }

    async fn send(&self, request: RequestBuilder) -> AppResult<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = upstream_message(status, &body);
        tracing::warn!("Catalog returned {}: {}", status, message);
        Err(AppError::Upstream {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> AppResult<T> {
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Extract the catalog's error message, which comes as
/// `{"error": {"code": 404, "message": "..."}}` or as a bare string
fn upstream_message(status: StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));

    error
        .and_then(|e| e.get("message").or(Some(e)))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Catalog error")
                .to_string()
        })
}
