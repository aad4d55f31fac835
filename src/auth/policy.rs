//! Access policy: pure `(session, requirement) -> verdict` decisions.
//!
//! ORDERING
//! ========
//! Checks run strictly in this order: loading, authentication, role,
//! privilege. A signed-out visitor therefore always gets a login redirect,
//! never a privilege message, and nothing is decided before the session has
//! been hydrated.
//!
//! `check_user` is the only role/privilege predicate in the crate. Both the
//! route guard (through `evaluate`) and the navigation composer call it, so a
//! menu entry is visible exactly when its route would be allowed.

#[cfg(test)]
#[path = "policy_test.rs"]
mod policy_test;

use std::fmt;

use super::store::Session;
use super::types::{Privilege, Role, User};

/// What a route or menu entry demands of the viewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Requirement {
    /// Any signed-in account.
    Authenticated,
    /// `role == admin`.
    Admin,
    /// Admin, or a data-entry account holding the privilege.
    Privilege(Privilege),
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticated => f.write_str("authenticated"),
            Self::Admin => f.write_str("admin"),
            Self::Privilege(p) => write!(f, "privilege:{p}"),
        }
    }
}

/// Why a requirement was not met.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    NotLoggedIn,
    InsufficientRole { required: Role },
    InsufficientPrivilege(Privilege),
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLoggedIn => f.write_str("not logged in"),
            Self::InsufficientRole { required } => write!(f, "requires role {required}"),
            Self::InsufficientPrivilege(p) => write!(f, "requires privilege {p}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny(DenyReason),
    /// Session still hydrating; show a waiting state.
    Pending,
}

impl Verdict {
    #[must_use]
    pub fn is_allowed(self) -> bool {
        self == Self::Allow
    }
}

/// Role/privilege check for a known user.
///
/// # Errors
///
/// Returns the reason the user falls short of `requirement`.
pub fn check_user(user: &User, requirement: Requirement) -> Result<(), DenyReason> {
    match requirement {
        Requirement::Authenticated => Ok(()),
        Requirement::Admin if user.is_admin() => Ok(()),
        Requirement::Admin => Err(DenyReason::InsufficientRole { required: Role::Admin }),
        Requirement::Privilege(p) if user.has_privilege(p) => Ok(()),
        Requirement::Privilege(p) => Err(DenyReason::InsufficientPrivilege(p)),
    }
}

/// Decide whether `session` may see something guarded by `requirement`.
#[must_use]
pub fn evaluate(session: &Session, requirement: Requirement) -> Verdict {
    if session.loading {
        return Verdict::Pending;
    }
    let Some(user) = session.user() else {
        return Verdict::Deny(DenyReason::NotLoggedIn);
    };
    match check_user(user, requirement) {
        Ok(()) => Verdict::Allow,
        Err(reason) => Verdict::Deny(reason),
    }
}
