//! HTTP transport to a BookFinder server

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{
    session::AuthStatusSource,
    shelves::{ShelfBackend, ShelfContents},
    ClientConfig, ClientError, ClientResult,
};
use crate::{
    models::{
        shelf::{AddShelfBook, LibraryShelvesResponse, ShelfBooksResponse, ShelvesResponse},
        ActionResponse, AuthStatus, Book, SearchResults, Shelf,
    },
    services::catalog::SearchParams,
};

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::Url(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Url(config.base_url));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
            access_token: config.access_token.filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }

    /// `base_url` joined with percent-encoded path segments
    pub fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn require_token(&self) -> ClientResult<&str> {
        self.access_token
            .as_deref()
            .ok_or_else(|| ClientError::Api("Not signed in to the catalog".to_string()))
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        decode_payload(status, &body)
    }

    async fn acknowledge(&self, request: RequestBuilder) -> ClientResult<()> {
        let ack: ActionResponse = self.fetch(request).await?;
        if ack.success {
            Ok(())
        } else {
            Err(ClientError::Api(ack.message))
        }
    }

    pub async fn auth_status(&self) -> ClientResult<AuthStatus> {
        let url = self.endpoint(&["api", "auth", "status"])?;
        self.fetch(self.authorized(self.client.get(url))).await
    }

    pub fn login_url(&self) -> ClientResult<Url> {
        self.endpoint(&["api", "auth", "login"])
    }

    pub fn logout_url(&self) -> ClientResult<Url> {
        self.endpoint(&["api", "auth", "logout"])
    }

    pub async fn search(&self, params: &SearchParams) -> ClientResult<SearchResults> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(q) = &params.q {
            query.push(("q", q.clone()));
        }
        if let Some(start_index) = params.start_index {
            query.push(("startIndex", start_index.to_string()));
        }
        if let Some(max_results) = params.max_results {
            query.push(("maxResults", max_results.to_string()));
        }
        if let Some(order_by) = &params.order_by {
            query.push(("orderBy", order_by.clone()));
        }
        if let Some(filter) = &params.filter {
            query.push(("filter", filter.clone()));
        }

        let url = self.endpoint(&["api", "books", "search"])?;
        self.fetch(self.client.get(url).query(&query)).await
    }

    /// Book details, annotated with what `user_id` recorded about it
    pub async fn get_book(&self, id: &str, user_id: Option<&str>) -> ClientResult<Book> {
        let url = self.endpoint(&["api", "books", id])?;
        let mut request = self.client.get(url);
        if let Some(user_id) = user_id {
            request = request.query(&[("user_id", user_id)]);
        }
        self.fetch(request).await
    }

    pub async fn related_books(&self, id: &str) -> ClientResult<Vec<Book>> {
        let url = self.endpoint(&["api", "books", id, "related"])?;
        let related: SearchResults = self.fetch(self.client.get(url)).await?;
        Ok(related.items)
    }
}

#[async_trait]
impl AuthStatusSource for ApiClient {
    async fn fetch_status(&self) -> ClientResult<AuthStatus> {
        self.auth_status().await
    }
}

/// Classify a server answer.
///
/// Non-success statuses and payloads carrying an `error` field are failures
/// even when the body otherwise decodes.
pub fn decode_payload<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> ClientResult<T> {
    let value = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => value,
            Err(_) if !status.is_success() => Value::Null,
            Err(e) => return Err(e.into()),
        }
    };

    let error = value
        .get("error")
        .filter(|e| !e.is_null())
        .map(error_message);

    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            message: error.unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            }),
        });
    }
    if let Some(message) = error {
        return Err(ClientError::Api(message));
    }

    Ok(serde_json::from_value(value)?)
}

fn error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => fields
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}

/// Shelves of the signed-in visitor's catalog library.
///
/// The owner argument is ignored; the access token identifies the library.
#[derive(Clone)]
pub struct LibraryBackend {
    api: ApiClient,
}

impl LibraryBackend {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ShelfBackend for LibraryBackend {
    async fn list_shelves(&self, _owner: &str) -> ClientResult<Vec<Shelf>> {
        let token = self.api.require_token()?;
        let url = self.api.endpoint(&["api", "mylibrary", "bookshelves"])?;
        let response: LibraryShelvesResponse =
            self.api.fetch(self.api.client.get(url).bearer_auth(token)).await?;
        Ok(response.items)
    }

    async fn add_book(&self, _owner: &str, shelf_id: &str, book: &Book) -> ClientResult<()> {
        let token = self.api.require_token()?;
        let url = self
            .api
            .endpoint(&["api", "mylibrary", "bookshelves", shelf_id, "addVolume"])?;
        let request = self
            .api
            .client
            .post(url)
            .query(&[("volumeId", book.id.as_str())])
            .bearer_auth(token);
        self.api.acknowledge(request).await
    }

    async fn remove_book(&self, _owner: &str, shelf_id: &str, book_id: &str) -> ClientResult<()> {
        let token = self.api.require_token()?;
        let url = self
            .api
            .endpoint(&["api", "mylibrary", "bookshelves", shelf_id, "removeVolume"])?;
        let request = self
            .api
            .client
            .post(url)
            .query(&[("volumeId", book_id)])
            .bearer_auth(token);
        self.api.acknowledge(request).await
    }

    async fn list_books(&self, _owner: &str, shelf_id: &str) -> ClientResult<ShelfContents> {
        let token = self.api.require_token()?;
        let url = self
            .api
            .endpoint(&["api", "mylibrary", "bookshelves", shelf_id, "volumes"])?;
        let volumes: SearchResults = self.api.fetch(self.api.client.get(url).bearer_auth(token)).await?;
        Ok(ShelfContents::Catalog(volumes.items))
    }
}

/// Shelves the server keeps for a visitor id
#[derive(Clone)]
pub struct LocalShelfBackend {
    api: ApiClient,
}

impl LocalShelfBackend {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ShelfBackend for LocalShelfBackend {
    async fn list_shelves(&self, owner: &str) -> ClientResult<Vec<Shelf>> {
        let url = self.api.endpoint(&["api", "bookshelves"])?;
        let response: ShelvesResponse = self
            .api
            .fetch(self.api.client.get(url).query(&[("user_id", owner)]))
            .await?;
        Ok(response.shelves)
    }

    async fn add_book(&self, owner: &str, shelf_id: &str, book: &Book) -> ClientResult<()> {
        let url = self.api.endpoint(&["api", "bookshelves", shelf_id, "books"])?;
        let body = AddShelfBook {
            user_id: Some(owner.to_string()),
            book: book.clone(),
            added_at: Some(Utc::now()),
        };
        let request = self
            .api
            .client
            .post(url)
            .query(&[("user_id", owner)])
            .json(&body);
        self.api.acknowledge(request).await
    }

    async fn remove_book(&self, owner: &str, shelf_id: &str, book_id: &str) -> ClientResult<()> {
        let url = self
            .api
            .endpoint(&["api", "bookshelves", shelf_id, "books", book_id])?;
        let request = self.api.client.delete(url).query(&[("user_id", owner)]);
        self.api.acknowledge(request).await
    }

    async fn list_books(&self, owner: &str, shelf_id: &str) -> ClientResult<ShelfContents> {
        let url = self.api.endpoint(&["api", "bookshelves", shelf_id, "books"])?;
        let response: ShelfBooksResponse = self
            .api
            .fetch(self.api.client.get(url).query(&[("user_id", owner)]))
            .await?;
        Ok(ShelfContents::Local(response.books))
    }
}
