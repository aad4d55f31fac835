//! Application handle.
//!
//! DESIGN
//! ======
//! Everything the back-office needs is built once, explicitly, from a
//! `Config`: the durable store, the session store over it, the navigation
//! history, the API client (which shares the session and history for its
//! 401 rule), and the router. There is no global state; callers own the
//! `App` and pass it where it is needed.
//!
//! LIFECYCLE
//! =========
//! `App::new` leaves the session loading. `start` hydrates it from storage,
//! after which guards resolve. Every mutation goes through the session store,
//! so any `subscribe`d watcher sees login, logout and expiry.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use crate::auth::nav;
use crate::auth::{AuthError, Credentials, LoginError, NavEntry, Session, SessionStore, User};
use crate::config::Config;
use crate::net::{ApiClient, ApiError};
use crate::router::{History, Navigator, Outcome, ROOT_PATH, Router};
use crate::storage::{FileStore, KvStore};

#[derive(Debug, Clone)]
pub struct App {
    session: SessionStore,
    history: Arc<History>,
    api: ApiClient,
    router: Router,
}

impl App {
    /// Wire an app whose session lives in the file named by the config.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Self::with_storage(config, Arc::new(FileStore::new(&config.store_path)))
    }

    /// Wire an app over an explicit storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub fn with_storage(config: &Config, storage: Arc<dyn KvStore>) -> Result<Self, ApiError> {
        let session = SessionStore::new(storage);
        let history = Arc::new(History::new(ROOT_PATH));
        let api = ApiClient::new(config, session.clone())?.with_navigator(history.clone());
        let router = Router::new(config.login_path.clone());
        Ok(Self { session, history, api, router })
    }

    /// Hydrate the session from durable storage.
    pub fn start(&self) -> Session {
        self.session.initialize()
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// # Errors
    ///
    /// Returns the message to show on the login form.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, LoginError> {
        self.session.login(&self.api, credentials).await
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    /// Re-read the signed-in user from the server.
    ///
    /// # Errors
    ///
    /// Returns the authenticator's error. A 401 also signs the session out.
    pub async fn refresh(&self) -> Result<Option<User>, AuthError> {
        let refreshed = self.session.refresh_profile(&self.api).await;
        if matches!(refreshed, Err(AuthError::Unauthorized)) {
            self.history.replace(self.router.login_path());
        }
        refreshed
    }

    /// Navigate to `path` and resolve it against the current session.
    pub fn visit(&self, path: &str) -> Outcome {
        self.router.visit(path, &self.session.snapshot(), self.history.as_ref())
    }

    /// Re-resolve the current location, e.g. after the session changed.
    pub fn reload(&self) -> Outcome {
        let path = self.history.current_path();
        self.router.resolve(&path, &self.session.snapshot(), self.history.as_ref())
    }

    #[must_use]
    pub fn sidebar(&self) -> Vec<NavEntry> {
        nav::sidebar_for(&self.session.snapshot())
    }

    #[must_use]
    pub fn navbar(&self) -> Vec<NavEntry> {
        nav::navbar(&self.session.snapshot())
    }
}
