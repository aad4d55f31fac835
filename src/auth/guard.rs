//! Route guard: projects the access policy onto what a protected view shows.
//!
//! SYSTEM CONTEXT
//! ==============
//! The guard holds no state of its own. Each call re-derives the outcome from
//! the current session and the route's requirement; `GuardWatch` re-runs that
//! projection whenever the session store publishes a change.
//!
//! UX
//! ==
//! The two denial causes are treated differently on purpose: a role mismatch
//! sends the visitor back to the storefront root, a missing privilege keeps
//! them on the page with an inline "Access Denied" message.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use tokio::sync::watch;

use super::policy::{DenyReason, Requirement, Verdict, evaluate};
use super::store::Session;
use crate::router::{Navigator, ROOT_PATH};

pub const ACCESS_DENIED_TITLE: &str = "Access Denied";
pub const ACCESS_DENIED_MESSAGE: &str = "You don't have permission to access this page.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardState {
    Pending,
    Unauthenticated,
    Forbidden(DenyReason),
    Granted,
}

impl From<Verdict> for GuardState {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Pending => Self::Pending,
            Verdict::Allow => Self::Granted,
            Verdict::Deny(DenyReason::NotLoggedIn) => Self::Unauthenticated,
            Verdict::Deny(reason) => Self::Forbidden(reason),
        }
    }
}

/// What the guarded slot should display after `render`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardView {
    /// Spinner; nothing was navigated.
    Loading,
    /// The navigator was sent here with history replacement.
    Redirected(String),
    AccessDenied { title: &'static str, message: &'static str },
    /// The wrapped view renders unchanged.
    Content,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteGuard {
    requirement: Requirement,
    login_path: String,
}

impl RouteGuard {
    #[must_use]
    pub fn new(requirement: Requirement, login_path: impl Into<String>) -> Self {
        Self { requirement, login_path: login_path.into() }
    }

    #[must_use]
    pub fn requirement(&self) -> Requirement {
        self.requirement
    }

    #[must_use]
    pub fn state(&self, session: &Session) -> GuardState {
        evaluate(session, self.requirement).into()
    }

    /// Evaluate and perform any redirect the outcome calls for.
    pub fn render(&self, session: &Session, navigator: &dyn Navigator) -> GuardView {
        match self.state(session) {
            GuardState::Pending => GuardView::Loading,
            GuardState::Granted => GuardView::Content,
            GuardState::Unauthenticated => {
                tracing::debug!(requirement = %self.requirement, to = %self.login_path, "guard: login required");
                navigator.replace(&self.login_path);
                GuardView::Redirected(self.login_path.clone())
            }
            GuardState::Forbidden(DenyReason::InsufficientRole { .. }) => {
                tracing::debug!(requirement = %self.requirement, "guard: role denied");
                navigator.replace(ROOT_PATH);
                GuardView::Redirected(ROOT_PATH.to_owned())
            }
            GuardState::Forbidden(reason) => {
                tracing::debug!(requirement = %self.requirement, %reason, "guard: access denied");
                GuardView::AccessDenied { title: ACCESS_DENIED_TITLE, message: ACCESS_DENIED_MESSAGE }
            }
        }
    }
}

/// A guard bound to a live session subscription.
pub struct GuardWatch {
    guard: RouteGuard,
    rx: watch::Receiver<Session>,
    last: GuardState,
}

impl GuardWatch {
    #[must_use]
    pub fn new(guard: RouteGuard, mut rx: watch::Receiver<Session>) -> Self {
        let last = guard.state(&rx.borrow_and_update());
        Self { guard, rx, last }
    }

    #[must_use]
    pub fn state(&self) -> GuardState {
        self.last
    }

    #[must_use]
    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    /// Wait until the projected state differs from the last one seen.
    /// Returns `None` once the session store has been dropped.
    pub async fn changed(&mut self) -> Option<GuardState> {
        loop {
            self.rx.changed().await.ok()?;
            let next = self.guard.state(&self.rx.borrow_and_update());
            if next != self.last {
                self.last = next;
                return Some(next);
            }
        }
    }

    /// Render against the latest session.
    pub fn render(&mut self, navigator: &dyn Navigator) -> GuardView {
        let session = self.rx.borrow_and_update().clone();
        self.last = self.guard.state(&session);
        self.guard.render(&session, navigator)
    }
}
