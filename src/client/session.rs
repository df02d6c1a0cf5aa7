//! Session resolver: who is the visitor

use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::{watch, Mutex, RwLock};

use super::{storage::LocalStorage, ClientError, ClientResult};
use crate::models::{AuthStatus, Identity, UserInfo};

/// Storage key of the persisted anonymous visitor id
pub const ANONYMOUS_ID_KEY: &str = "anonymousUserId";

const ANONYMOUS_PREFIX: &str = "anon-";
const ANONYMOUS_SUFFIX_LEN: usize = 13;
const ANONYMOUS_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

const DEFAULT_LOGIN_URL: &str = "/api/auth/login";
const DEFAULT_LOGOUT_URL: &str = "/api/auth/logout";

/// Where the auth status comes from
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthStatusSource: Send + Sync {
    async fn fetch_status(&self) -> ClientResult<AuthStatus>;
}

#[derive(Debug, Default)]
struct SessionState {
    identity: Option<Identity>,
    resolved: bool,
    /// Anonymous id used while storage cannot be read
    temporary_id: Option<String>,
}

/// Resolves the single active identity of a session.
///
/// A visitor is either signed in to the catalog or gets an anonymous id that
/// is generated once and then reused from storage for as long as the storage
/// keeps it.
pub struct SessionResolver {
    source: Arc<dyn AuthStatusSource>,
    storage: Arc<dyn LocalStorage>,
    state: RwLock<SessionState>,
    anonymous_lock: Mutex<()>,
    identity_tx: watch::Sender<Option<Identity>>,
    login_url: String,
    logout_url: String,
}

impl SessionResolver {
    pub fn new(source: Arc<dyn AuthStatusSource>, storage: Arc<dyn LocalStorage>) -> Self {
        let (identity_tx, _) = watch::channel(None);
        Self {
            source,
            storage,
            state: RwLock::new(SessionState::default()),
            anonymous_lock: Mutex::new(()),
            identity_tx,
            login_url: DEFAULT_LOGIN_URL.to_string(),
            logout_url: DEFAULT_LOGOUT_URL.to_string(),
        }
    }

    pub fn with_auth_urls(mut self, login_url: impl Into<String>, logout_url: impl Into<String>) -> Self {
        self.login_url = login_url.into();
        self.logout_url = logout_url.into();
        self
    }

    /// Ask the auth status endpoint who the visitor is and adopt the answer.
    ///
    /// Never fails: anything short of an authenticated user with an id
    /// resolves to the anonymous identity.
    pub async fn check_auth_status(&self) -> Identity {
        let identity = match self.source.fetch_status().await {
            Ok(status) => match status.authenticated_user() {
                Some(user) => Identity::Authenticated(user.clone()),
                None => Identity::Anonymous(self.anonymous_id().await),
            },
            Err(e) => self.fall_back_to_anonymous(e).await,
        };

        {
            let mut state = self.state.write().await;
            state.identity = Some(identity.clone());
            state.resolved = true;
        }

        self.identity_tx.send_if_modified(|current| {
            if current.as_ref() == Some(&identity) {
                false
            } else {
                *current = Some(identity.clone());
                true
            }
        });

        tracing::debug!(
            user_id = identity.user_id(),
            authenticated = identity.is_authenticated(),
            "Session identity resolved"
        );
        identity
    }

    async fn fall_back_to_anonymous(&self, error: ClientError) -> Identity {
        tracing::warn!("Failed to check auth status, continuing anonymously: {}", error);
        Identity::Anonymous(self.anonymous_id().await)
    }

    /// The persisted anonymous id, generated and stored on first use
    async fn anonymous_id(&self) -> String {
        let _guard = self.anonymous_lock.lock().await;

        match self.storage.get(ANONYMOUS_ID_KEY).await {
            Ok(Some(id)) if !id.trim().is_empty() => return id,
            Ok(_) => {}
            Err(e) => {
                // Unreadable storage might still hold an id; do not overwrite it.
                tracing::warn!("Failed to read anonymous id, using a temporary one: {}", e);
                return self.temporary_anonymous_id().await;
            }
        }

        // A temporary id handed out earlier in this session becomes the persisted one.
        let id = self
            .state
            .read()
            .await
            .temporary_id
            .clone()
            .unwrap_or_else(generate_anonymous_id);
        if let Err(e) = self.storage.set(ANONYMOUS_ID_KEY, &id).await {
            tracing::warn!("Failed to persist anonymous id: {}", e);
        }
        id
    }

    async fn temporary_anonymous_id(&self) -> String {
        self.state
            .write()
            .await
            .temporary_id
            .get_or_insert_with(generate_anonymous_id)
            .clone()
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.state.read().await.identity.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .await
            .identity
            .as_ref()
            .is_some_and(Identity::is_authenticated)
    }

    pub async fn user(&self) -> Option<UserInfo> {
        self.state
            .read()
            .await
            .identity
            .as_ref()
            .and_then(|i| i.user().cloned())
    }

    pub async fn user_id(&self) -> Option<String> {
        self.state
            .read()
            .await
            .identity
            .as_ref()
            .map(|i| i.user_id().to_string())
    }

    /// True until the first resolution completes
    pub async fn is_loading(&self) -> bool {
        !self.state.read().await.resolved
    }

    /// Receives every identity change
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity_tx.subscribe()
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    pub fn logout_url(&self) -> &str {
        &self.logout_url
    }
}

/// `anon-` followed by 13 characters of `[a-z0-9]`
pub fn generate_anonymous_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ANONYMOUS_SUFFIX_LEN)
        .map(|_| ANONYMOUS_CHARSET[rng.gen_range(0..ANONYMOUS_CHARSET.len())] as char)
        .collect();
    format!("{}{}", ANONYMOUS_PREFIX, suffix)
}
