//! Recent search terms

use std::sync::Arc;

use super::{storage::LocalStorage, ClientResult};

pub const RECENT_SEARCHES_KEY: &str = "recentSearches";
pub const DEFAULT_CAPACITY: usize = 10;

/// Most recent first, without duplicates, bounded
pub struct SearchHistory {
    storage: Arc<dyn LocalStorage>,
    capacity: usize,
}

impl SearchHistory {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self::with_capacity(storage, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(storage: Arc<dyn LocalStorage>, capacity: usize) -> Self {
        Self {
            storage,
            capacity: capacity.max(1),
        }
    }

    pub async fn recent(&self) -> ClientResult<Vec<String>> {
        let Some(raw) = self.storage.get(RECENT_SEARCHES_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(terms) => Ok(terms),
            Err(e) => {
                tracing::warn!("Discarding unreadable search history: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Record a search and return the updated history
    pub async fn record(&self, term: &str) -> ClientResult<Vec<String>> {
        let term = term.trim();
        let mut terms = self.recent().await?;
        if term.is_empty() {
            return Ok(terms);
        }

        terms.retain(|t| t != term);
        terms.insert(0, term.to_string());
        terms.truncate(self.capacity);

        self.storage
            .set(RECENT_SEARCHES_KEY, &serde_json::to_string(&terms)?)
            .await?;
        Ok(terms)
    }

    pub async fn clear(&self) -> ClientResult<()> {
        self.storage.remove(RECENT_SEARCHES_KEY).await
    }
}
