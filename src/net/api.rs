//! REST API client for the deals back-end.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every call carries the current session token as a bearer header. A 401 on
//! any authenticated call is a global rule, not a per-caller concern: the
//! client expires the session and replaces the location with the login route
//! before handing `ApiError::Unauthorized` back.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses become `ApiError::Status` carrying the server's
//! `message` field when the body has one.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::{AuthError, Authenticator, Credentials, LoginResponse, SessionStore, User};
use crate::config::Config;
use crate::router::Navigator;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unauthorized; session cleared")]
    Unauthorized,
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

/// Pull a human-readable reason out of an error body.
fn error_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::to_owned)
}

fn bearer(token: &str) -> Result<HeaderValue, reqwest::header::InvalidHeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
    value.set_sensitive(true);
    Ok(value)
}

/// `/auth/profile` answers either with the user or with `{ "user": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProfileBody {
    Wrapped { user: User },
    Bare(User),
}

impl ProfileBody {
    fn into_user(self) -> User {
        match self {
            Self::Wrapped { user } | Self::Bare(user) => user,
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    session: SessionStore,
    navigator: Option<Arc<dyn Navigator>>,
    login_path: String,
}

impl ApiClient {
    /// Build a client for `config.api_url` that reads tokens from `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the HTTP client
    /// cannot be built.
    pub fn new(config: &Config, session: SessionStore) -> Result<Self, ApiError> {
        let base = Url::parse(&config.api_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", config.api_url)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.api_url.clone()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()?;
        Ok(Self { http, base, session, navigator: None, login_path: config.login_path.clone() })
    }

    /// Route the forced logout redirect through `navigator`.
    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot take path segments.
    pub fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send an authenticated JSON request and decode the JSON answer.
    /// Empty bodies decode as `Value::Null`.
    ///
    /// # Errors
    ///
    /// `ApiError::Unauthorized` after a 401 (the session is already cleared),
    /// `ApiError::Status` for any other non-2xx, `ApiError::Http` for
    /// transport failures.
    pub async fn request(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = self.url(segments)?;
        tracing::debug!(%method, %url, "api request");

        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(token) = self.session.token() {
            request = request.header(AUTHORIZATION, bearer(&token)?);
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(json) = body {
            request = request.json(json);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(%method, %url, "api rejected session token");
            self.handle_unauthorized();
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let message = error_message(&value).unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_owned());
            tracing::warn!(%method, %url, status = status.as_u16(), %message, "api request failed");
            return Err(ApiError::Status { status: status.as_u16(), message });
        }
        Ok(value)
    }

    fn handle_unauthorized(&self) {
        self.session.expire();
        if let Some(navigator) = &self.navigator {
            navigator.replace(&self.login_path);
        }
    }
}

#[async_trait]
impl Authenticator for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, AuthError> {
        let url = self.url(&["auth", "login"]).map_err(|e| AuthError::Transport(e.to_string()))?;
        let response = self
            .http
            .post(url)
            .json(credentials)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| AuthError::Transport(e.to_string()))?;
        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body).ok().as_ref().and_then(error_message);
            return Err(AuthError::Rejected { status: status.as_u16(), message });
        }
        serde_json::from_str::<LoginResponse>(&body).map_err(|e| AuthError::Decode(e.to_string()))
    }

    async fn profile(&self, token: &str) -> Result<User, AuthError> {
        let url = self.url(&["auth", "profile"]).map_err(|e| AuthError::Transport(e.to_string()))?;
        let header = bearer(token).map_err(|e| AuthError::Transport(e.to_string()))?;
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, header)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::Unauthorized);
        }
        let body = response.text().await.map_err(|e| AuthError::Transport(e.to_string()))?;
        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body).ok().as_ref().and_then(error_message);
            return Err(AuthError::Rejected { status: status.as_u16(), message });
        }
        serde_json::from_str::<ProfileBody>(&body)
            .map(ProfileBody::into_user)
            .map_err(|e| AuthError::Decode(e.to_string()))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .field("login_path", &self.login_path)
            .finish_non_exhaustive()
    }
}
