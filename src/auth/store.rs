//! Session store: the single source of truth for "who is logged in".
//!
//! SYSTEM CONTEXT
//! ==============
//! One `SessionStore` is built at process start (see `app::App`) and cloned
//! into every collaborator that needs it. Route guards and navigation read
//! snapshots; only `initialize`, `login`, `logout`, `expire`, and
//! `refresh_profile` write.
//!
//! DESIGN
//! ======
//! The current `Session` lives in a `tokio::sync::watch` channel. Every
//! mutation publishes through it, so subscribers re-evaluate guards and menus
//! on change instead of polling. Token and user travel together in
//! `Identity`, which makes a half-valid session unrepresentable.
//!
//! PERSISTENCE
//! ===========
//! Two keys: `token` (opaque string) and `user` (a versioned JSON envelope).
//! An envelope from an older schema is discarded on load and the process
//! starts signed out.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::authenticator::{AuthError, Authenticator, LoginError};
use super::types::{Credentials, LoginResponse, Privilege, User};
use crate::storage::{KvStore, StorageError, TOKEN_KEY, USER_KEY};

/// Schema version written into the persisted user envelope.
pub const USER_SCHEMA_VERSION: u32 = 1;

// =============================================================================
// SESSION
// =============================================================================

/// Token plus the user snapshot it was issued for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub token: String,
    pub user: User,
}

/// Authentication state of the current process.
///
/// `Default` is the start-up state: loading, nobody signed in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    /// True until the durable store has been consulted.
    pub loading: bool,
    pub identity: Option<Identity>,
}

impl Default for Session {
    fn default() -> Self {
        Self { loading: true, identity: None }
    }
}

impl Session {
    /// Settled, unauthenticated state.
    #[must_use]
    pub fn signed_out() -> Self {
        Self { loading: false, identity: None }
    }

    #[must_use]
    pub fn signed_in(token: String, user: User) -> Self {
        Self { loading: false, identity: Some(Identity { token, user }) }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.token.as_str())
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.identity.as_ref().map(|i| &i.user)
    }

    /// False without a user; true for admins; otherwise the privilege flag.
    #[must_use]
    pub fn has_privilege(&self, privilege: Privilege) -> bool {
        self.user().is_some_and(|u| u.has_privilege(privilege))
    }

    #[must_use]
    pub fn has_privilege_named(&self, name: &str) -> bool {
        self.user().is_some_and(|u| u.has_privilege_named(name))
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(User::is_admin)
    }

    #[must_use]
    pub fn is_data_entry(&self) -> bool {
        self.user().is_some_and(User::is_data_entry)
    }
}

#[derive(Serialize, Deserialize)]
struct UserEnvelope {
    version: u32,
    user: User,
}

fn encode_user(user: &User) -> Result<String, serde_json::Error> {
    serde_json::to_string(&UserEnvelope { version: USER_SCHEMA_VERSION, user: user.clone() })
}

fn decode_user(raw: &str) -> Option<User> {
    let envelope: UserEnvelope = serde_json::from_str(raw).ok()?;
    (envelope.version == USER_SCHEMA_VERSION).then_some(envelope.user)
}

// =============================================================================
// SESSION STORE
// =============================================================================

struct Inner {
    storage: Arc<dyn KvStore>,
    tx: watch::Sender<Session>,
    /// Held across each durable write and the publish that follows it, so
    /// storage and the published session never describe different identities.
    writer: Mutex<()>,
}

/// Cloneable handle to the process-wide session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Build a store in the loading state. Call `initialize` before rendering
    /// anything guarded.
    #[must_use]
    pub fn new(storage: Arc<dyn KvStore>) -> Self {
        let (tx, _rx) = watch::channel(Session::default());
        Self { inner: Arc::new(Inner { storage, tx, writer: Mutex::new(()) }) }
    }

    /// Current session value.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.tx.borrow().clone()
    }

    /// Receive every subsequent session change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.tx.subscribe()
    }

    /// Rehydrate from durable storage. No network call is made; a dead token
    /// is discovered by the first API call that gets a 401.
    pub fn initialize(&self) -> Session {
        let _writer = self.writer();
        let identity = match self.read_persisted() {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(error = %e, "session storage unavailable; starting signed out");
                None
            }
        };
        let session = Session { loading: false, identity };
        match session.user() {
            Some(user) => tracing::debug!(user_id = %user.id, role = %user.role, "session restored"),
            None => tracing::debug!("no persisted session"),
        }
        self.publish(session.clone());
        session
    }

    /// Exchange credentials for a session. On failure the current session,
    /// and its persisted copy, are left as they were.
    ///
    /// # Errors
    ///
    /// Returns a `LoginError` carrying the message to show on the login form.
    pub async fn login(&self, auth: &dyn Authenticator, credentials: &Credentials) -> Result<User, LoginError> {
        tracing::info!(email = %credentials.email, "login attempt");
        let LoginResponse { token, user } = match auth.login(credentials).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(email = %credentials.email, error = %e, "login failed");
                return Err(e.into());
            }
        };

        self.commit_login(token, &user)?;
        tracing::info!(user_id = %user.id, role = %user.role, "login succeeded");
        Ok(user)
    }

    /// Forget the session locally. Never fails and needs no server round-trip.
    pub fn logout(&self) {
        if self.sign_out() {
            tracing::info!("logged out");
        }
    }

    /// Implicit logout after the API rejected the token.
    pub fn expire(&self) {
        if self.sign_out() {
            tracing::info!("session expired; signed out");
        }
    }

    /// Re-fetch the user behind the current token and replace the snapshot.
    ///
    /// Returns `Ok(None)` when nobody is signed in, or when the session was
    /// replaced while the profile was in flight (the answer is then stale and
    /// nothing is written).
    ///
    /// # Errors
    ///
    /// Propagates the collaborator's error. `AuthError::Unauthorized` also
    /// expires the session if it still holds the rejected token.
    pub async fn refresh_profile(&self, auth: &dyn Authenticator) -> Result<Option<User>, AuthError> {
        let Some(token) = self.snapshot().token().map(str::to_owned) else {
            return Ok(None);
        };

        let user = match auth.profile(&token).await {
            Ok(user) => user,
            Err(AuthError::Unauthorized) => {
                if self.sign_out_if(|session| session.token() == Some(token.as_str())) {
                    tracing::info!("session expired; signed out");
                }
                return Err(AuthError::Unauthorized);
            }
            Err(e) => return Err(e),
        };

        if !self.commit_refresh(&token, &user) {
            tracing::debug!("session changed during profile refresh; result dropped");
            return Ok(None);
        }
        Ok(Some(user))
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.tx.borrow().is_authenticated()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.inner.tx.borrow().token().map(str::to_owned)
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.inner.tx.borrow().user().cloned()
    }

    #[must_use]
    pub fn has_privilege(&self, privilege: Privilege) -> bool {
        self.inner.tx.borrow().has_privilege(privilege)
    }

    #[must_use]
    pub fn has_privilege_named(&self, name: &str) -> bool {
        self.inner.tx.borrow().has_privilege_named(name)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.inner.tx.borrow().is_admin()
    }

    #[must_use]
    pub fn is_data_entry(&self) -> bool {
        self.inner.tx.borrow().is_data_entry()
    }

    // -------------------------------------------------------------------------

    fn writer(&self) -> MutexGuard<'_, ()> {
        self.inner.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persist and publish a fresh login. On a failed write the previous
    /// identity's keys are put back and the session is not touched.
    fn commit_login(&self, token: String, user: &User) -> Result<(), LoginError> {
        let _writer = self.writer();
        if let Err(e) = self.persist(&token, user) {
            tracing::error!(error = %e, "failed to persist session");
            match self.snapshot().identity {
                Some(previous) => {
                    if let Err(e) = self.persist(&previous.token, &previous.user) {
                        tracing::warn!(error = %e, "failed to restore previous session");
                        self.clear_persisted();
                    }
                }
                None => self.clear_persisted(),
            }
            return Err(LoginError::new("Login failed: session could not be saved"));
        }
        self.publish(Session::signed_in(token, user.clone()));
        Ok(())
    }

    /// Store a refreshed profile, but only while `token` is still the live
    /// session's token. Returns false when the session moved on.
    fn commit_refresh(&self, token: &str, user: &User) -> bool {
        let _writer = self.writer();
        if self.snapshot().token() != Some(token) {
            return false;
        }
        match encode_user(user) {
            Ok(raw) => {
                if let Err(e) = self.inner.storage.set(USER_KEY, &raw) {
                    tracing::warn!(error = %e, "failed to persist refreshed profile");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to encode refreshed profile"),
        }
        self.publish(Session::signed_in(token.to_owned(), user.clone()));
        true
    }

    fn sign_out(&self) -> bool {
        self.sign_out_if(|_| true)
    }

    fn sign_out_if<F>(&self, still_current: F) -> bool
    where
        F: FnOnce(&Session) -> bool,
    {
        let _writer = self.writer();
        if !still_current(&self.snapshot()) {
            return false;
        }
        self.clear_persisted();
        self.publish(Session::signed_out())
    }

    /// Publish `next`, notifying subscribers only on an actual change.
    fn publish(&self, next: Session) -> bool {
        self.inner.tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        })
    }

    fn read_persisted(&self) -> Result<Option<Identity>, StorageError> {
        let storage = &self.inner.storage;
        let token = storage.get(TOKEN_KEY)?.filter(|t| !t.is_empty());
        let raw_user = storage.get(USER_KEY)?.filter(|u| !u.is_empty());
        let (Some(token), Some(raw_user)) = (token, raw_user) else {
            return Ok(None);
        };

        if let Some(user) = decode_user(&raw_user) {
            Ok(Some(Identity { token, user }))
        } else {
            tracing::warn!("discarding persisted session with unreadable user record");
            self.clear_persisted();
            Ok(None)
        }
    }

    fn persist(&self, token: &str, user: &User) -> Result<(), StorageError> {
        let raw_user = encode_user(user)?;
        self.inner.storage.set(TOKEN_KEY, token)?;
        self.inner.storage.set(USER_KEY, &raw_user)?;
        Ok(())
    }

    fn clear_persisted(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.inner.storage.remove(key) {
                tracing::warn!(key, error = %e, "failed to clear persisted session key");
            }
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.inner.tx.borrow();
        f.debug_struct("SessionStore")
            .field("loading", &session.loading)
            .field("user_id", &session.user().map(|u| u.id.as_str()))
            .finish_non_exhaustive()
    }
}
