//! Role/privilege-gated access control for the back-office.
//!
//! Dependency order: `store` (session state) feeds `policy` (decisions),
//! which both `guard` (route rendering) and `nav` (menus) consult.

pub mod authenticator;
pub mod guard;
pub mod nav;
pub mod policy;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use authenticator::{AuthError, Authenticator, LoginError};
pub use guard::{GuardState, GuardView, GuardWatch, RouteGuard};
pub use nav::NavEntry;
pub use policy::{DenyReason, Requirement, Verdict, evaluate};
pub use store::{Identity, Session, SessionStore};
pub use types::{Credentials, LoginResponse, Privilege, Privileges, Role, User};
