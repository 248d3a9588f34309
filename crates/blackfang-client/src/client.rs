//! HTTP client for the dashboard REST API.
//!
//! Every response is wrapped in a `{ data, meta }` envelope; errors arrive as
//! `{ error: { code, message }, meta }` and surface as [`ClientError::Api`].

use std::sync::Arc;
use std::time::Duration;

use blackfang_core::wire::{
    AlertPage, DashboardData, LoginRequest, LoginResponse, LogoutResult, MarkAllReadResult,
    RefreshRequest, TokenPair,
};
use blackfang_core::{Alert, Competitor, CompetitorPatch, NewCompetitor, User};
use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::ClientError;
use crate::session::{SessionHook, StoredSession};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Client for the dashboard API.
///
/// Use [`BlackfangClient::new`] with the server's base URL; tests point it at
/// a wiremock server the same way.
pub struct BlackfangClient {
    client: Client,
    base_url: Url,
    session: RwLock<Option<StoredSession>>,
    hook: Option<Arc<dyn SessionHook>>,
}

impl BlackfangClient {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT_SECS)
    }

    /// # Errors
    ///
    /// Same as [`BlackfangClient::new`].
    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("blackfang/0.1 (dashboard-client)")
            .build()?;

        // Exactly one trailing slash so `join("api/...")` appends rather than
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: parsed,
            session: RwLock::new(None),
            hook: None,
        })
    }

    /// Attach a session store and resume any session it holds.
    ///
    /// # Errors
    ///
    /// Returns the hook's error if the stored session cannot be read.
    pub fn with_session_hook(mut self, hook: Arc<dyn SessionHook>) -> Result<Self, ClientError> {
        let stored = hook.load()?;
        if stored.is_some() {
            tracing::debug!("resumed stored session");
        }
        self.session = RwLock::new(stored);
        self.hook = Some(hook);
        Ok(self)
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn session(&self) -> Option<StoredSession> {
        self.session.read().await.clone()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// # Errors
    ///
    /// - [`ClientError::Api`] with status 401 for a rejected credential pair.
    /// - [`ClientError::Http`] on network failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let body = LoginRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        let response: LoginResponse = self
            .execute(
                self.request(Method::POST, "api/auth/login")?.json(&body),
                "login",
            )
            .await?;

        let stored = StoredSession::new(response.user.clone(), response.tokens);
        self.persist(&stored)?;
        *self.session.write().await = Some(stored);
        tracing::info!(user_id = response.user.id, "logged in");
        Ok(response.user)
    }

    /// Revoke the server session and forget local tokens. Local state is
    /// cleared even if the server call fails.
    ///
    /// # Errors
    ///
    /// Returns the server or hook error after local state has been cleared.
    pub async fn logout(&self) -> Result<bool, ClientError> {
        let remote = match self.authed(Method::POST, "api/auth/logout").await {
            Ok(request) => self
                .execute::<LogoutResult>(request, "logout")
                .await
                .map(|r| r.revoked),
            Err(ClientError::NotAuthenticated) => Ok(false),
            Err(e) => Err(e),
        };

        *self.session.write().await = None;
        if let Some(hook) = &self.hook {
            hook.clear()?;
        }
        remote
    }

    /// Exchange the refresh token for a new pair.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotAuthenticated`] without a session.
    /// - [`ClientError::Api`] with status 401 if the refresh token is stale.
    pub async fn refresh_session(&self) -> Result<(), ClientError> {
        let refresh_token = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.refresh_token.clone())
            .ok_or(ClientError::NotAuthenticated)?;

        let tokens: TokenPair = self
            .execute(
                self.request(Method::POST, "api/auth/refresh")?
                    .json(&RefreshRequest { refresh_token }),
                "refresh",
            )
            .await?;

        let mut guard = self.session.write().await;
        let session = guard.as_mut().ok_or(ClientError::NotAuthenticated)?;
        session.replace_tokens(tokens);
        self.persist(session)?;
        tracing::debug!("session tokens rotated");
        Ok(())
    }

    /// # Errors
    ///
    /// - [`ClientError::NotAuthenticated`] without a session.
    /// - [`ClientError::Api`] when the server returns an error envelope.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the payload has an unexpected shape.
    pub async fn me(&self) -> Result<User, ClientError> {
        self.get("api/auth/me", "me").await
    }

    /// # Errors
    ///
    /// See [`BlackfangClient::me`].
    pub async fn dashboard(&self) -> Result<DashboardData, ClientError> {
        self.get("api/dashboard", "dashboard").await
    }

    /// # Errors
    ///
    /// See [`BlackfangClient::me`].
    pub async fn competitors(&self) -> Result<Vec<Competitor>, ClientError> {
        self.get("api/competitors", "competitors").await
    }

    /// # Errors
    ///
    /// See [`BlackfangClient::me`]; unknown ids come back as a 404
    /// [`ClientError::Api`].
    pub async fn competitor(&self, id: i64) -> Result<Competitor, ClientError> {
        self.get(&format!("api/competitors/{id}"), "competitor").await
    }

    /// # Errors
    ///
    /// A 400 [`ClientError::Api`] for a blank name or website.
    pub async fn create_competitor(&self, new: &NewCompetitor) -> Result<Competitor, ClientError> {
        let request = self.authed(Method::POST, "api/competitors").await?.json(new);
        self.execute(request, "create_competitor").await
    }

    /// # Errors
    ///
    /// A 404 or 400 [`ClientError::Api`] for an unknown id or invalid patch.
    pub async fn update_competitor(
        &self,
        id: i64,
        patch: &CompetitorPatch,
    ) -> Result<Competitor, ClientError> {
        let request = self
            .authed(Method::PATCH, &format!("api/competitors/{id}"))
            .await?
            .json(patch);
        self.execute(request, "update_competitor").await
    }

    /// # Errors
    ///
    /// A 404 [`ClientError::Api`] for an unknown id.
    pub async fn delete_competitor(&self, id: i64) -> Result<Competitor, ClientError> {
        let request = self
            .authed(Method::DELETE, &format!("api/competitors/{id}"))
            .await?;
        self.execute(request, "delete_competitor").await
    }

    /// Fetch one page of alerts. `severity` of `None` means every alert.
    ///
    /// # Errors
    ///
    /// See [`BlackfangClient::me`].
    pub async fn alerts(
        &self,
        severity: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<AlertPage, ClientError> {
        let mut request = self
            .authed(Method::GET, "api/alerts")
            .await?
            .query(&[("limit", limit), ("offset", offset)]);
        if let Some(severity) = severity {
            request = request.query(&[("severity", severity)]);
        }
        self.execute(request, "alerts").await
    }

    /// # Errors
    ///
    /// A 404 [`ClientError::Api`] for an unknown or archived alert.
    pub async fn mark_alert_read(&self, id: i64) -> Result<Alert, ClientError> {
        self.post_empty(&format!("api/alerts/{id}/read"), "mark_alert_read")
            .await
    }

    /// Returns how many alerts changed.
    ///
    /// # Errors
    ///
    /// See [`BlackfangClient::me`].
    pub async fn mark_all_read(&self) -> Result<usize, ClientError> {
        let result: MarkAllReadResult = self
            .post_empty("api/alerts/read-all", "mark_all_read")
            .await?;
        Ok(result.updated)
    }

    /// # Errors
    ///
    /// A 404 [`ClientError::Api`] for an unknown alert.
    pub async fn archive_alert(&self, id: i64) -> Result<Alert, ClientError> {
        self.post_empty(&format!("api/alerts/{id}/archive"), "archive_alert")
            .await
    }

    /// Public liveness probe.
    ///
    /// # Errors
    ///
    /// [`ClientError::Http`] if the server is unreachable.
    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        self.execute(self.request(Method::GET, "api/health")?, "health")
            .await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, context: &str) -> Result<T, ClientError> {
        let request = self.authed(Method::GET, path).await?;
        self.execute(request, context).await
    }

    async fn post_empty<T: DeserializeOwned>(
        &self,
        path: &str,
        context: &str,
    ) -> Result<T, ClientError> {
        let request = self.authed(Method::POST, path).await?;
        self.execute(request, context).await
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })?;
        Ok(self.client.request(method, url))
    }

    /// Build a request carrying the bearer token, rotating it first if it
    /// has expired.
    async fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let expired = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.is_expired(Utc::now()))
            .ok_or(ClientError::NotAuthenticated)?;
        if expired {
            self.refresh_session().await?;
        }

        let token = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
            .ok_or(ClientError::NotAuthenticated)?;
        Ok(self.request(method, path)?.bearer_auth(token))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let (code, message) = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => (envelope.error.code, envelope.error.message),
                Err(_) => ("http_error".to_string(), body),
            };
            tracing::debug!(context, status = status.as_u16(), code = %code, "API error");
            return Err(ClientError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        serde_json::from_str::<Envelope<T>>(&body)
            .map(|envelope| envelope.data)
            .map_err(|e| ClientError::Deserialize {
                context: context.to_owned(),
                source: e,
            })
    }

    fn persist(&self, session: &StoredSession) -> Result<(), ClientError> {
        match &self.hook {
            Some(hook) => hook.save(session),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for BlackfangClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlackfangClient")
            .field("base_url", &self.base_url.as_str())
            .field("has_hook", &self.hook.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalised_to_one_trailing_slash() {
        let client = BlackfangClient::new("http://localhost:3000///").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:3000/");
        let url = client.base_url().join("api/alerts").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/alerts");
    }

    #[test]
    fn base_url_keeps_path_prefix() {
        let client = BlackfangClient::new("https://intel.example.com/v2").unwrap();
        let url = client.base_url().join("api/dashboard").unwrap();
        assert_eq!(url.as_str(), "https://intel.example.com/v2/api/dashboard");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = BlackfangClient::new("not a url").unwrap_err();
        assert!(matches!(err, ClientError::InvalidBaseUrl { .. }));
    }

    #[tokio::test]
    async fn protected_call_without_login_fails_fast() {
        let client = BlackfangClient::new("http://127.0.0.1:9").unwrap();
        let err = client.dashboard().await.unwrap_err();
        assert!(err.is_unauthorized());
    }
}
