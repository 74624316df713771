//! Session-authenticated client for the Jira notification log.
//!
//! The client owns the session cookie. Authenticated calls are sent with the
//! current session; when the service answers 403 the client logs in again and
//! re-issues the request once.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use shared::{LoginRequest, Notification, NotificationsResponse, UnseenCountResponse};
use std::time::Duration;

use crate::error::ClientError;

pub const NOTIFICATIONS_PATH: &str = "/gateway/api/notification-log/api/2/notifications";
pub const UNSEEN_COUNT_PATH: &str =
    "/gateway/api/notification-log/api/2/notifications/count/unseen";
pub const DEFAULT_IDENTITY_URL: &str = "https://id.atlassian.com/id/rest/login";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// The two reads the polling worker needs from the remote service.
#[async_trait]
pub trait NotificationSource: Send {
    /// Server-side counter of unseen notifications
    async fn fetch_unseen_count(&mut self) -> Result<i64, ClientError>;

    /// Every notification currently visible to the account
    async fn fetch_notifications(&mut self) -> Result<Vec<Notification>, ClientError>;
}

/// Client for a single Jira Cloud account
pub struct SessionClient {
    host: String,
    identity_url: String,
    http: Client,
    credentials: Vec<u8>,
    session: Option<String>,
}

impl SessionClient {
    /// Validate the connection settings. Does not touch the network.
    pub fn connect(host: &str, username: &str, password: &str) -> Result<Self, ClientError> {
        let host = host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(ClientError::config("host must not be empty"));
        }

        let url = Url::parse(host)
            .map_err(|e| ClientError::config(format!("invalid host '{}': {}", host, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::config(format!(
                "host '{}' must use http or https",
                host
            )));
        }

        if username.trim().is_empty() {
            return Err(ClientError::config("username must not be empty"));
        }

        let credentials = serde_json::to_vec(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })
        .map_err(|e| ClientError::config(format!("failed to encode credentials: {}", e)))?;

        Ok(Self {
            host: host.to_string(),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            http: build_http_client(DEFAULT_TIMEOUT)?,
            credentials,
            session: None,
        })
    }

    /// Use a different identity endpoint for logging in
    pub fn with_identity_url(mut self, identity_url: impl Into<String>) -> Self {
        self.identity_url = identity_url.into();
        self
    }

    /// Replace the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ClientError> {
        self.http = build_http_client(timeout)?;
        Ok(self)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// Check that the host exists, then exchange the credentials for a session.
    pub async fn login(&mut self) -> Result<(), ClientError> {
        self.check_host().await?;

        let response = self
            .http
            .post(&self.identity_url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(self.credentials.clone())
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(ClientError::HostUnreachable(self.identity_url.clone()))
            }
            StatusCode::FORBIDDEN => return Err(ClientError::InvalidCredentials),
            _ => {}
        }

        let response = response.error_for_status()?;
        let session = session_from_headers(response.headers()).ok_or_else(|| {
            ClientError::Decode("login response did not set a session cookie".to_string())
        })?;

        self.session = Some(session);
        tracing::debug!("Logged in to {}", self.host);

        Ok(())
    }

    async fn check_host(&self) -> Result<(), ClientError> {
        let response = self.http.get(&self.host).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::HostUnreachable(self.host.clone()));
        }

        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&mut self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.host, path);

        let mut response = self.send_authenticated(&url).await?;
        if response.status() == StatusCode::FORBIDDEN {
            tracing::info!("Session rejected by {}, logging in again", self.host);
            if let Err(e) = self.login().await {
                tracing::warn!("Re-login to {} failed: {}", self.host, e);
            }
            response = self.send_authenticated(&url).await?;
        }

        let body = response.error_for_status()?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send_authenticated(&self, url: &str) -> Result<reqwest::Response, ClientError> {
        let mut request = self.http.get(url).header(header::CONNECTION, "keep-alive");
        if let Some(session) = &self.session {
            request = request.header(header::COOKIE, session);
        }

        Ok(request.send().await?)
    }
}

#[async_trait]
impl NotificationSource for SessionClient {
    async fn fetch_unseen_count(&mut self) -> Result<i64, ClientError> {
        let response: UnseenCountResponse = self.get_json(UNSEEN_COUNT_PATH).await?;
        Ok(response.count)
    }

    async fn fetch_notifications(&mut self) -> Result<Vec<Notification>, ClientError> {
        let response: NotificationsResponse = self.get_json(NOTIFICATIONS_PATH).await?;
        Ok(response.notifications)
    }
}

fn build_http_client(timeout: Duration) -> Result<Client, ClientError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ClientError::config(format!("failed to build HTTP client: {}", e)))
}

/// Turn every `Set-Cookie` header into a single `Cookie` header value,
/// dropping cookie attributes such as `Path` or `HttpOnly`.
fn session_from_headers(headers: &header::HeaderMap) -> Option<String> {
    let cookies: Vec<&str> = headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect();

    if cookies.is_empty() {
        None
    } else {
        Some(cookies.join("; "))
    }
}
