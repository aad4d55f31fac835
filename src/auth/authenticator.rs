//! Authentication collaborator boundary.
//!
//! The session store never talks HTTP itself; it is handed something that can
//! exchange credentials for a token and look up the profile behind a token.

use async_trait::async_trait;

use super::types::{Credentials, LoginResponse, User};

/// Fallback message when the server gives no reason for a failed login.
pub const DEFAULT_LOGIN_FAILURE: &str = "Login failed";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The server answered but refused the request (bad credentials, inactive
    /// account). `message` is the server-provided reason when present.
    #[error("authentication rejected ({status}): {}", message.as_deref().unwrap_or(DEFAULT_LOGIN_FAILURE))]
    Rejected { status: u16, message: Option<String> },
    /// The token presented is no longer accepted.
    #[error("unauthorized")]
    Unauthorized,
    #[error("auth transport error: {0}")]
    Transport(String),
    #[error("unexpected auth response: {0}")]
    Decode(String),
}

/// Login failure surfaced to the login form. Returned as a value, never
/// raised past the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LoginError {
    pub message: String,
}

impl LoginError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl From<AuthError> for LoginError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Rejected { message: Some(message), .. } if !message.trim().is_empty() => Self { message },
            _ => Self::new(DEFAULT_LOGIN_FAILURE),
        }
    }
}

/// Exchanges credentials for a session token and resolves tokens to users.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// `POST /auth/login`.
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, AuthError>;

    /// `GET /auth/profile` with `token` as bearer.
    async fn profile(&self, token: &str) -> Result<User, AuthError>;
}
