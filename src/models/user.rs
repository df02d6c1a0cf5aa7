//! Visitor identity models

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Owner id used when a request does not name a visitor
pub const ANONYMOUS_USER: &str = "anonymous";

/// Authenticated catalog user
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub picture: Option<String>,
}

/// Answer of the auth status endpoint
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthStatus {
    #[serde(default)]
    pub authenticated: bool,
    pub user: Option<UserInfo>,
}

impl AuthStatus {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: UserInfo) -> Self {
        Self {
            authenticated: true,
            user: Some(user),
        }
    }

    /// The user, when the status is authenticated and carries a usable id
    pub fn authenticated_user(&self) -> Option<&UserInfo> {
        if !self.authenticated {
            return None;
        }
        self.user.as_ref().filter(|u| !u.id.trim().is_empty())
    }
}

/// The single active identity of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Authenticated(UserInfo),
    Anonymous(String),
}

impl Identity {
    pub fn user_id(&self) -> &str {
        match self {
            Identity::Authenticated(user) => &user.id,
            Identity::Anonymous(id) => id,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated(_))
    }

    pub fn user(&self) -> Option<&UserInfo> {
        match self {
            Identity::Authenticated(user) => Some(user),
            Identity::Anonymous(_) => None,
        }
    }
}

/// `?user_id=` query parameter of the per-visitor endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UserQuery {
    pub user_id: Option<String>,
}

impl UserQuery {
    pub fn user_id(&self) -> &str {
        resolve_user_id(self.user_id.as_deref())
    }
}

/// Falls back to the shared anonymous owner for missing or blank ids
pub fn resolve_user_id(user_id: Option<&str>) -> &str {
    match user_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => ANONYMOUS_USER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserInfo {
        UserInfo {
            id: id.to_string(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            picture: None,
        }
    }

    #[test]
    fn test_authenticated_user_requires_id() {
        assert!(AuthStatus::authenticated(user("u-1")).authenticated_user().is_some());
        assert!(AuthStatus::authenticated(user("  ")).authenticated_user().is_none());
        assert!(AuthStatus::anonymous().authenticated_user().is_none());

        let inconsistent = AuthStatus {
            authenticated: false,
            user: Some(user("u-1")),
        };
        assert!(inconsistent.authenticated_user().is_none());
    }

    #[test]
    fn test_identity_user_id() {
        assert_eq!(Identity::Authenticated(user("u-1")).user_id(), "u-1");
        assert_eq!(Identity::Anonymous("anon-x".into()).user_id(), "anon-x");
    }

    #[test]
    fn test_resolve_user_id() {
        assert_eq!(resolve_user_id(None), ANONYMOUS_USER);
        assert_eq!(resolve_user_id(Some("")), ANONYMOUS_USER);
        assert_eq!(resolve_user_id(Some("anon-1")), "anon-1");
    }

    #[test]
    fn test_parse_status_without_user() {
        let status: AuthStatus = serde_json::from_str(r#"{"authenticated": false}"#).unwrap();
        assert_eq!(status, AuthStatus::anonymous());
    }
}
