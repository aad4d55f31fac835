//! Shared user/session builders for unit tests.

use super::authenticator::{AuthError, Authenticator};
use super::store::{Identity, Session};
use super::types::{Credentials, LoginResponse, Privileges, Role, User};

pub(crate) fn admin() -> User {
    User {
        id: "admin-1".into(),
        email: "admin@hop4deals.test".into(),
        role: Role::Admin,
        privileges: Privileges::default(),
        is_active: true,
        created_at: None,
    }
}

pub(crate) fn data_entry(privileges: Privileges) -> User {
    User {
        id: "entry-1".into(),
        email: "entry@hop4deals.test".into(),
        role: Role::DataEntry,
        privileges,
        is_active: true,
        created_at: None,
    }
}

pub(crate) fn signed_in(user: User) -> Session {
    Session { loading: false, identity: Some(Identity { token: "tok-1".into(), user }) }
}

pub(crate) fn signed_out() -> Session {
    Session { loading: false, identity: None }
}

pub(crate) fn hydrating() -> Session {
    Session { loading: true, identity: None }
}

/// Authenticator that accepts every login with a fixed response.
pub(crate) struct StaticAuth(pub LoginResponse);

impl StaticAuth {
    pub(crate) fn new(token: &str, user: User) -> Self {
        Self(LoginResponse { token: token.into(), user })
    }
}

#[async_trait::async_trait]
impl Authenticator for StaticAuth {
    async fn login(&self, _credentials: &Credentials) -> Result<LoginResponse, AuthError> {
        Ok(self.0.clone())
    }

    async fn profile(&self, _token: &str) -> Result<User, AuthError> {
        Ok(self.0.user.clone())
    }
}
