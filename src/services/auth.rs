//! Auth status resolution against the identity provider

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{AuthStatus, UserInfo},
};

/// OpenID Connect userinfo document
#[derive(Debug, Deserialize)]
struct ProviderUserInfo {
    sub: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    picture: Option<String>,
}

impl From<ProviderUserInfo> for UserInfo {
    fn from(info: ProviderUserInfo) -> Self {
        UserInfo {
            id: info.sub,
            name: info.name,
            email: info.email,
            picture: info.picture,
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    client: Client,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig, timeout_secs: u64) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn login_url(&self) -> &str {
        &self.config.login_url
    }

    pub fn logout_url(&self) -> &str {
        &self.config.logout_url
    }

    /// Resolve who owns `token`.
    ///
    /// Never fails: a missing token, a rejected token or an unreachable
    /// provider all answer "not authenticated".
    pub async fn status(&self, token: Option<&str>) -> AuthStatus {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return AuthStatus::anonymous();
        };

        match self.fetch_user(token).await {
            Ok(user) => AuthStatus::authenticated(user),
            Err(e) => {
                tracing::warn!("Token rejected by identity provider: {}", e);
                AuthStatus::anonymous()
            }
        }
    }

    async fn fetch_user(&self, token: &str) -> AppResult<UserInfo> {
        let response = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Authentication(format!(
                "userinfo answered {}",
                response.status()
            )));
        }

        let info: ProviderUserInfo = response.json().await?;
        Ok(info.into())
    }
}
