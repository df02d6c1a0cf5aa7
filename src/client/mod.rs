//! Client library for BookFinder front ends
//!
//! [`SessionResolver`] decides who the visitor is, [`ShelfSynchronizer`]
//! routes shelf operations to the catalog library or to the server's local
//! shelves and keeps a shelf list snapshot current. [`ApiClient`] is the HTTP
//! transport both of them use against a BookFinder server.

pub mod api;
pub mod history;
pub mod session;
pub mod shelves;
pub mod storage;

use std::time::Duration;

use thiserror::Error;

pub use api::{ApiClient, LibraryBackend, LocalShelfBackend};
pub use history::SearchHistory;
pub use session::{AuthStatusSource, SessionResolver};
pub use shelves::{ShelfBackend, ShelfContents, ShelfListState, ShelfSynchronizer};
pub use storage::{FileStorage, LocalStorage, MemoryStorage};

/// Client side error type
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Api(String),

    #[error("Unexpected payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid URL: {0}")]
    Url(String),
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Storage(e.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Connection settings of an [`ApiClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root of the BookFinder server, e.g. `http://localhost:8080`
    pub base_url: String,
    /// Catalog access token of a signed-in visitor
    pub access_token: Option<String>,
    /// Per request timeout; none by default
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: None,
            timeout: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
