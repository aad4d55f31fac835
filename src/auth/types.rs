//! Identity DTOs shared by the session store, policy, and HTTP client.
//!
//! DESIGN
//! ======
//! Field names mirror the REST API's camelCase JSON so a user record can be
//! persisted verbatim and rehydrated without a translation layer.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Coarse identity class of a back-office account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full administrator. Holds every capability.
    #[serde(rename = "admin")]
    Admin,
    /// Restricted account whose access is the privilege map.
    #[serde(rename = "dataEntry")]
    DataEntry,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::DataEntry => "dataEntry",
        }
    }

    /// Human label shown beside the account in back-office chrome.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::DataEntry => "Data Entry User",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named back-office module a data-entry user may be granted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Privilege {
    Categories,
    Brands,
    Deals,
    Blogs,
}

impl Privilege {
    /// Every privilege in menu order.
    pub const ALL: [Privilege; 4] = [Self::Categories, Self::Brands, Self::Deals, Self::Blogs];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Brands => "brands",
            Self::Deals => "deals",
            Self::Blogs => "blogs",
        }
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown privilege: {0}")]
pub struct UnknownPrivilege(pub String);

impl FromStr for Privilege {
    type Err = UnknownPrivilege;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "categories" => Ok(Self::Categories),
            "brands" => Ok(Self::Brands),
            "deals" => Ok(Self::Deals),
            "blogs" => Ok(Self::Blogs),
            other => Err(UnknownPrivilege(other.to_owned())),
        }
    }
}

/// Per-module grant flags. Missing keys decode as `false`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Privileges {
    pub categories: bool,
    pub brands: bool,
    pub deals: bool,
    pub blogs: bool,
}

impl Privileges {
    /// Grant every module.
    #[must_use]
    pub fn all() -> Self {
        Self { categories: true, brands: true, deals: true, blogs: true }
    }

    #[must_use]
    pub fn get(&self, privilege: Privilege) -> bool {
        match privilege {
            Privilege::Categories => self.categories,
            Privilege::Brands => self.brands,
            Privilege::Deals => self.deals,
            Privilege::Blogs => self.blogs,
        }
    }

    pub fn set(&mut self, privilege: Privilege, granted: bool) {
        match privilege {
            Privilege::Categories => self.categories = granted,
            Privilege::Brands => self.brands = granted,
            Privilege::Deals => self.deals = granted,
            Privilege::Blogs => self.blogs = granted,
        }
    }

    /// Builder-style grant.
    #[must_use]
    pub fn with(mut self, privilege: Privilege) -> Self {
        self.set(privilege, true);
        self
    }

    /// Held privileges in menu order.
    pub fn granted(&self) -> impl Iterator<Item = Privilege> + '_ {
        Privilege::ALL.into_iter().filter(|p| self.get(*p))
    }
}

fn default_active() -> bool {
    true
}

/// Back-office account snapshot captured at login or profile refresh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-assigned identifier.
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    pub role: Role,
    /// Absent for most admin records; admins bypass it anyway.
    #[serde(default)]
    pub privileges: Privileges,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<OffsetDateTime>,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    #[must_use]
    pub fn is_data_entry(&self) -> bool {
        self.role == Role::DataEntry
    }

    /// Admins hold every privilege; data-entry users hold exactly their flags.
    #[must_use]
    pub fn has_privilege(&self, privilege: Privilege) -> bool {
        self.is_admin() || self.privileges.get(privilege)
    }

    /// Name-based lookup. Unknown names are denied unless the user is admin.
    #[must_use]
    pub fn has_privilege_named(&self, name: &str) -> bool {
        if self.is_admin() {
            return true;
        }
        name.parse::<Privilege>().is_ok_and(|p| self.privileges.get(p))
    }
}

/// Email/password pair submitted to the login endpoint.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful `POST /auth/login` body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}
