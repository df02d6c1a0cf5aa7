//! BookFinder
//!
//! Book search service built on an external catalog. The server side proxies
//! catalog search and lookups, answers the auth status of a visitor and keeps
//! local shelves, favorites, reading lists, notes and reviews for visitors who
//! are not signed in to the catalog. The [`client`] module holds the session
//! resolver and shelf synchronizer a front end uses to talk to it.

use std::sync::Arc;

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig, repository: repository::Repository) -> AppResult<Self> {
        let services = services::Services::new(&config, repository)?;
        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }
}
