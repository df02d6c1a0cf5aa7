//! Shelf synchronizer
//!
//! Routes shelf operations to the catalog library when the visitor is signed
//! in and to the server's local shelves otherwise, and keeps a snapshot of the
//! shelf list that is reloaded after every identity change and every
//! successful mutation.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::{
    sync::{watch, RwLock},
    task::JoinHandle,
};

use super::ClientResult;
use crate::models::{Book, Identity, Shelf, ShelfBook};

/// Books on a shelf, in the shape the backend returns them
#[derive(Debug, Clone, PartialEq)]
pub enum ShelfContents {
    /// Catalog volumes, which carry no add time
    Catalog(Vec<Book>),
    /// Entries as stored by the local shelf store
    Local(Vec<ShelfBook>),
}

impl ShelfContents {
    /// Uniform entries; catalog volumes are stamped with the current time
    pub fn into_entries(self) -> Vec<ShelfBook> {
        match self {
            ShelfContents::Catalog(books) => {
                let now = Utc::now();
                books
                    .into_iter()
                    .map(|book| ShelfBook {
                        id: book.id,
                        added_at: now,
                        volume_info: book.volume_info,
                    })
                    .collect()
            }
            ShelfContents::Local(entries) => entries,
        }
    }
}

/// A place shelves live in
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShelfBackend: Send + Sync {
    async fn list_shelves(&self, owner: &str) -> ClientResult<Vec<Shelf>>;
    async fn add_book(&self, owner: &str, shelf_id: &str, book: &Book) -> ClientResult<()>;
    async fn remove_book(&self, owner: &str, shelf_id: &str, book_id: &str) -> ClientResult<()>;
    async fn list_books(&self, owner: &str, shelf_id: &str) -> ClientResult<ShelfContents>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ShelfListState {
    #[default]
    Uninitialized,
    Loading,
    Ready(Vec<Shelf>),
    Errored(String),
}

pub struct ShelfSynchronizer {
    library: Arc<dyn ShelfBackend>,
    local: Arc<dyn ShelfBackend>,
    identity: RwLock<Option<Identity>>,
    state: RwLock<ShelfListState>,
    generation: AtomicU64,
}

impl ShelfSynchronizer {
    pub fn new(library: Arc<dyn ShelfBackend>, local: Arc<dyn ShelfBackend>) -> Self {
        Self {
            library,
            local,
            identity: RwLock::new(None),
            state: RwLock::new(ShelfListState::Uninitialized),
            generation: AtomicU64::new(0),
        }
    }

    fn backend(&self, identity: &Identity) -> &dyn ShelfBackend {
        if identity.is_authenticated() {
            self.library.as_ref()
        } else {
            self.local.as_ref()
        }
    }

    async fn current_identity(&self) -> Option<Identity> {
        self.identity.read().await.clone()
    }

    /// Adopt an identity; the shelf list is discarded and reloaded when the
    /// owner changed (authenticated flag or user id)
    pub async fn set_identity(&self, identity: Option<Identity>) {
        let changed = {
            let mut current = self.identity.write().await;
            let changed = owner_key(current.as_ref()) != owner_key(identity.as_ref());
            *current = identity;
            if changed {
                // In-flight refreshes belong to the previous owner.
                self.generation.fetch_add(1, Ordering::SeqCst);
            }
            changed
        };

        if changed {
            *self.state.write().await = ShelfListState::Uninitialized;
            self.refresh().await;
        }
    }

    /// Follow the identities published by a session resolver
    pub fn watch_identity(self: Arc<Self>, mut identities: watch::Receiver<Option<Identity>>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let identity = identities.borrow_and_update().clone();
                self.set_identity(identity).await;
                if identities.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    /// Reload the shelf list. Without an identity this does nothing.
    pub async fn refresh(&self) {
        // The generation is taken under the identity guard so an owner change
        // cannot slip in between the two.
        let (identity, generation) = {
            let current = self.identity.read().await;
            let Some(identity) = current.clone() else {
                return;
            };
            (identity, self.generation.fetch_add(1, Ordering::SeqCst) + 1)
        };

        {
            let mut state = self.state.write().await;
            if !self.is_current(generation) {
                return;
            }
            *state = ShelfListState::Loading;
        }

        let result = self.backend(&identity).list_shelves(identity.user_id()).await;

        let mut state = self.state.write().await;
        if !self.is_current(generation) {
            tracing::debug!(user_id = identity.user_id(), "Discarding superseded shelf list");
            return;
        }
        *state = match result {
            Ok(shelves) => ShelfListState::Ready(shelves),
            Err(e) => {
                tracing::warn!(user_id = identity.user_id(), "Failed to fetch bookshelves: {}", e);
                ShelfListState::Errored(e.to_string())
            }
        };
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Put a book on a shelf; the shelf list is reloaded on success
    pub async fn add_book_to_shelf(&self, shelf_id: &str, book: &Book) -> bool {
        let Some(identity) = self.current_identity().await else {
            tracing::warn!(shelf_id, "No identity yet, cannot add book to shelf");
            return false;
        };

        match self
            .backend(&identity)
            .add_book(identity.user_id(), shelf_id, book)
            .await
        {
            Ok(()) => {
                self.refresh().await;
                true
            }
            Err(e) => {
                tracing::error!(shelf_id, book_id = %book.id, "Error adding book to shelf: {}", e);
                false
            }
        }
    }

    /// Take a book off a shelf; the shelf list is reloaded on success
    pub async fn remove_book_from_shelf(&self, shelf_id: &str, book_id: &str) -> bool {
        let Some(identity) = self.current_identity().await else {
            tracing::warn!(shelf_id, "No identity yet, cannot remove book from shelf");
            return false;
        };

        match self
            .backend(&identity)
            .remove_book(identity.user_id(), shelf_id, book_id)
            .await
        {
            Ok(()) => {
                self.refresh().await;
                true
            }
            Err(e) => {
                tracing::error!(shelf_id, book_id, "Error removing book from shelf: {}", e);
                false
            }
        }
    }

    /// Entries of a shelf, empty on any failure
    pub async fn get_books_in_shelf(&self, shelf_id: &str) -> Vec<ShelfBook> {
        let Some(identity) = self.current_identity().await else {
            return Vec::new();
        };

        match self
            .backend(&identity)
            .list_books(identity.user_id(), shelf_id)
            .await
        {
            Ok(contents) => contents.into_entries(),
            Err(e) => {
                tracing::error!(shelf_id, "Error fetching books in shelf: {}", e);
                Vec::new()
            }
        }
    }

    /// Shelf list snapshot; empty unless loaded
    pub async fn shelves(&self) -> Vec<Shelf> {
        match &*self.state.read().await {
            ShelfListState::Ready(shelves) => shelves.clone(),
            _ => Vec::new(),
        }
    }

    pub async fn state(&self) -> ShelfListState {
        self.state.read().await.clone()
    }

    pub async fn is_loading(&self) -> bool {
        matches!(
            *self.state.read().await,
            ShelfListState::Uninitialized | ShelfListState::Loading
        )
    }

    pub async fn error(&self) -> Option<String> {
        match &*self.state.read().await {
            ShelfListState::Errored(message) => Some(message.clone()),
            _ => None,
        }
    }
}

fn owner_key(identity: Option<&Identity>) -> Option<(bool, &str)> {
    identity.map(|i| (i.is_authenticated(), i.user_id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::ClientError,
        models::{UserInfo, VolumeInfo},
    };
    use mockall::predicate::eq;
    use tokio::sync::Notify;

    /// Local backend whose shelf list is held until released
    struct GatedBackend {
        shelves: Vec<Shelf>,
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl ShelfBackend for GatedBackend {
        async fn list_shelves(&self, _owner: &str) -> ClientResult<Vec<Shelf>> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(self.shelves.clone())
        }

        async fn add_book(&self, _owner: &str, _shelf_id: &str, _book: &Book) -> ClientResult<()> {
            Ok(())
        }

        async fn remove_book(&self, _owner: &str, _shelf_id: &str, _book_id: &str) -> ClientResult<()> {
            Ok(())
        }

        async fn list_books(&self, _owner: &str, _shelf_id: &str) -> ClientResult<ShelfContents> {
            Ok(ShelfContents::Local(Vec::new()))
        }
    }

    fn gated_synchronizer() -> (Arc<ShelfSynchronizer>, Arc<Notify>, Arc<Notify>) {
        let mut library = MockShelfBackend::new();
        library
            .expect_list_shelves()
            .with(eq("u-1"))
            .returning(|_| Ok(vec![shelf("7", "Library", 3)]));
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let local = GatedBackend {
            shelves: vec![shelf("0", "Anonymous", 1)],
            started: started.clone(),
            release: release.clone(),
        };
        let sync = Arc::new(ShelfSynchronizer::new(Arc::new(library), Arc::new(local)));
        (sync, started, release)
    }

    fn shelf(id: &str, name: &str, count: usize) -> Shelf {
        Shelf {
            id: id.into(),
            name: name.into(),
            book_count: count,
        }
    }

    fn book(id: &str, title: &str) -> Book {
        Book {
            id: id.into(),
            volume_info: VolumeInfo {
                title: title.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn signed_in() -> Identity {
        Identity::Authenticated(UserInfo {
            id: "u-1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            picture: None,
        })
    }

    fn anonymous() -> Identity {
        Identity::Anonymous("anon-abc123def4567".into())
    }

    fn synchronizer(library: MockShelfBackend, local: MockShelfBackend) -> ShelfSynchronizer {
        ShelfSynchronizer::new(Arc::new(library), Arc::new(local))
    }

    #[tokio::test]
    async fn test_previous_owner_list_is_discarded() {
        let (sync, started, release) = gated_synchronizer();

        let pending = tokio::spawn({
            let sync = sync.clone();
            async move { sync.set_identity(Some(anonymous())).await }
        });
        started.notified().await;
        assert_eq!(sync.state().await, ShelfListState::Loading);

        sync.set_identity(Some(signed_in())).await;
        assert_eq!(sync.state().await, ShelfListState::Ready(vec![shelf("7", "Library", 3)]));

        release.notify_one();
        pending.await.unwrap();

        assert_eq!(sync.state().await, ShelfListState::Ready(vec![shelf("7", "Library", 3)]));
        assert!(sync.shelves().await.iter().all(|s| s.id != "0"));
    }

    #[tokio::test]
    async fn test_stale_refresh_does_not_reset_state() {
        let (sync, started, release) = gated_synchronizer();

        let first = tokio::spawn({
            let sync = sync.clone();
            async move { sync.set_identity(Some(anonymous())).await }
        });
        started.notified().await;
        // A second refresh for the same owner supersedes the first one
        let second = tokio::spawn({
            let sync = sync.clone();
            async move { sync.refresh().await }
        });
        started.notified().await;

        sync.set_identity(Some(signed_in())).await;
        release.notify_waiters();
        first.await.unwrap();
        second.await.unwrap();

        assert_eq!(sync.state().await, ShelfListState::Ready(vec![shelf("7", "Library", 3)]));
        assert!(!sync.is_loading().await);
    }

    #[tokio::test]
    async fn test_no_identity_is_noop() {
        let sync = synchronizer(MockShelfBackend::new(), MockShelfBackend::new());

        sync.refresh().await;
        assert_eq!(sync.state().await, ShelfListState::Uninitialized);
        assert!(!sync.add_book_to_shelf("2", &book("b1", "Dune")).await);
        assert!(!sync.remove_book_from_shelf("2", "b1").await);
        assert!(sync.get_books_in_shelf("2").await.is_empty());
    }

    #[tokio::test]
    async fn test_authenticated_routes_to_library() {
        let mut library = MockShelfBackend::new();
        library
            .expect_list_shelves()
            .returning(|_| Ok(vec![shelf("0", "Favorites", 0)]));
        library
            .expect_add_book()
            .withf(|_, shelf_id, book| shelf_id == "0" && book.id == "b1")
            .times(1)
            .returning(|_, _, _| Ok(()));
        let mut local = MockShelfBackend::new();
        local.expect_list_shelves().never();
        local.expect_add_book().never();

        let sync = synchronizer(library, local);
        sync.set_identity(Some(signed_in())).await;

        assert!(sync.add_book_to_shelf("0", &book("b1", "Dune")).await);
        assert_eq!(sync.shelves().await, vec![shelf("0", "Favorites", 0)]);
    }

    #[tokio::test]
    async fn test_anonymous_routes_to_local_with_user_id() {
        let mut library = MockShelfBackend::new();
        library.expect_list_shelves().never();
        library.expect_add_book().never();
        let mut local = MockShelfBackend::new();
        local
            .expect_list_shelves()
            .with(eq("anon-abc123def4567"))
            .returning(|_| Ok(vec![shelf("2", "To Read", 1)]));
        local
            .expect_add_book()
            .withf(|owner, shelf_id, book| {
                owner == "anon-abc123def4567" && shelf_id == "2" && book.id == "b1"
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let sync = synchronizer(library, local);
        sync.set_identity(Some(anonymous())).await;

        assert!(sync.add_book_to_shelf("2", &book("b1", "Dune")).await);
        assert!(!sync.is_loading().await);
        assert_eq!(sync.shelves().await[0].book_count, 1);
    }

    #[tokio::test]
    async fn test_failed_mutation_returns_false_without_refresh() {
        let mut local = MockShelfBackend::new();
        local
            .expect_list_shelves()
            .times(1)
            .returning(|_| Ok(vec![shelf("2", "To Read", 0)]));
        local
            .expect_remove_book()
            .returning(|_, _, _| Err(ClientError::Status {
                status: 404,
                message: "Book not found in shelf".into(),
            }));

        let sync = synchronizer(MockShelfBackend::new(), local);
        sync.set_identity(Some(anonymous())).await;

        assert!(!sync.remove_book_from_shelf("2", "missing").await);
        assert_eq!(sync.shelves().await, vec![shelf("2", "To Read", 0)]);
    }

    #[tokio::test]
    async fn test_error_payload_yields_empty_books() {
        let mut local = MockShelfBackend::new();
        local.expect_list_shelves().returning(|_| Ok(Vec::new()));
        local
            .expect_list_books()
            .returning(|_, _| Err(ClientError::Api("shelf not found".into())));

        let sync = synchronizer(MockShelfBackend::new(), local);
        sync.set_identity(Some(anonymous())).await;

        assert!(sync.get_books_in_shelf("999").await.is_empty());
    }

    #[tokio::test]
    async fn test_catalog_volumes_are_normalized() {
        let mut library = MockShelfBackend::new();
        library.expect_list_shelves().returning(|_| Ok(Vec::new()));
        library.expect_list_books().returning(|_, _| {
            Ok(ShelfContents::Catalog(vec![book("v1", "Dune"), book("v2", "Emma")]))
        });

        let sync = synchronizer(library, MockShelfBackend::new());
        sync.set_identity(Some(signed_in())).await;

        let before = Utc::now();
        let entries = sync.get_books_in_shelf("0").await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "v1");
        assert_eq!(entries[1].volume_info, book("v2", "Emma").volume_info);
        assert!(entries.iter().all(|e| e.added_at >= before));
    }

    #[tokio::test]
    async fn test_local_entries_returned_verbatim() {
        let stored = ShelfBook {
            id: "b1".into(),
            added_at: "2024-03-01T10:00:00Z".parse().unwrap(),
            volume_info: book("b1", "Dune").volume_info,
        };
        let returned = stored.clone();
        let mut local = MockShelfBackend::new();
        local.expect_list_shelves().returning(|_| Ok(Vec::new()));
        local
            .expect_list_books()
            .returning(move |_, _| Ok(ShelfContents::Local(vec![returned.clone()])));

        let sync = synchronizer(MockShelfBackend::new(), local);
        sync.set_identity(Some(anonymous())).await;

        assert_eq!(sync.get_books_in_shelf("2").await, vec![stored]);
    }

    #[tokio::test]
    async fn test_list_failure_sets_error() {
        let mut local = MockShelfBackend::new();
        local
            .expect_list_shelves()
            .returning(|_| Err(ClientError::Api("boom".into())));

        let sync = synchronizer(MockShelfBackend::new(), local);
        sync.set_identity(Some(anonymous())).await;

        assert_eq!(sync.state().await, ShelfListState::Errored("boom".into()));
        assert_eq!(sync.error().await.as_deref(), Some("boom"));
        assert!(sync.shelves().await.is_empty());
    }

    #[tokio::test]
    async fn test_identity_change_reloads_from_other_backend() {
        let mut library = MockShelfBackend::new();
        library
            .expect_list_shelves()
            .times(1)
            .returning(|_| Ok(vec![shelf("7", "Library", 3)]));
        let mut local = MockShelfBackend::new();
        local
            .expect_list_shelves()
            .times(1)
            .returning(|_| Ok(vec![shelf("0", "Favorites", 0)]));

        let sync = synchronizer(library, local);
        sync.set_identity(Some(anonymous())).await;
        assert_eq!(sync.shelves().await[0].id, "0");

        // Same owner again does not reload
        sync.set_identity(Some(anonymous())).await;

        sync.set_identity(Some(signed_in())).await;
        assert_eq!(sync.shelves().await[0].id, "7");
    }

    #[tokio::test]
    async fn test_watch_identity_follows_resolver() {
        let mut local = MockShelfBackend::new();
        local
            .expect_list_shelves()
            .returning(|_| Ok(vec![shelf("0", "Favorites", 0)]));

        let sync = Arc::new(synchronizer(MockShelfBackend::new(), local));
        let (tx, rx) = watch::channel(None);
        let handle = sync.clone().watch_identity(rx);

        tx.send(Some(anonymous())).unwrap();
        for _ in 0..100 {
            if !sync.shelves().await.is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(sync.shelves().await.len(), 1);

        drop(tx);
        handle.await.unwrap();
    }
}
