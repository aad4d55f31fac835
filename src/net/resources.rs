//! CRUD collaborators for the back-office collections.
//!
//! Each collection lives under `{base}/{resource}` and speaks plain JSON.
//! Bodies are passed through as `serde_json::Value`; the back-end owns the
//! record shapes.

#[cfg(test)]
#[path = "resources_test.rs"]
mod resources_test;

use std::fmt;
use std::str::FromStr;

use reqwest::Method;
use serde_json::Value;

use super::api::{ApiClient, ApiError};
use crate::auth::{Privilege, Requirement};

/// Whether a call only reads a collection or changes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Users,
    Categories,
    Brands,
    Deals,
    Blogs,
    Seasons,
}

impl Resource {
    pub const ALL: [Resource; 6] =
        [Self::Users, Self::Categories, Self::Brands, Self::Deals, Self::Blogs, Self::Seasons];

    /// Path segment under the API base.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Categories => "categories",
            Self::Brands => "brands",
            Self::Deals => "deals",
            Self::Blogs => "blogs",
            Self::Seasons => "seasons",
        }
    }

    /// What the session must hold before the back-office may touch this
    /// collection. Account and season management are admin-only.
    #[must_use]
    pub fn requirement(self) -> Requirement {
        match self {
            Self::Users | Self::Seasons => Requirement::Admin,
            Self::Categories => Requirement::Privilege(Privilege::Categories),
            Self::Brands => Requirement::Privilege(Privilege::Brands),
            Self::Deals => Requirement::Privilege(Privilege::Deals),
            Self::Blogs => Requirement::Privilege(Privilege::Blogs),
        }
    }

    /// Requirement for `access`, or `None` when the storefront reads it
    /// without a session. Every collection but `users` is publicly readable.
    #[must_use]
    pub fn requirement_for(self, access: Access) -> Option<Requirement> {
        match (self, access) {
            (Self::Users, _) | (_, Access::Write) => Some(self.requirement()),
            (_, Access::Read) => None,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource: {0}")]
pub struct UnknownResource(pub String);

impl FromStr for Resource {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.path().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownResource(s.to_owned()))
    }
}

/// Borrowed view of one collection on an [`ApiClient`].
#[derive(Debug, Clone, Copy)]
pub struct ResourceClient<'a> {
    api: &'a ApiClient,
    resource: Resource,
}

impl ApiClient {
    #[must_use]
    pub fn resource(&self, resource: Resource) -> ResourceClient<'_> {
        ResourceClient { api: self, resource }
    }
}

impl ResourceClient<'_> {
    #[must_use]
    pub fn kind(&self) -> Resource {
        self.resource
    }

    /// `GET /{resource}` with optional query filters.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the underlying request.
    pub async fn list(&self, query: &[(String, String)]) -> Result<Value, ApiError> {
        self.api.request(Method::GET, &[self.resource.path()], query, None).await
    }

    /// `GET /{resource}/{id}`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the underlying request.
    pub async fn get(&self, id: &str) -> Result<Value, ApiError> {
        self.api.request(Method::GET, &[self.resource.path(), id], &[], None).await
    }

    /// `POST /{resource}`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the underlying request.
    pub async fn create(&self, body: &Value) -> Result<Value, ApiError> {
        self.api.request(Method::POST, &[self.resource.path()], &[], Some(body)).await
    }

    /// `PUT /{resource}/{id}`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the underlying request.
    pub async fn update(&self, id: &str, body: &Value) -> Result<Value, ApiError> {
        self.api.request(Method::PUT, &[self.resource.path(), id], &[], Some(body)).await
    }

    /// `DELETE /{resource}/{id}`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the underlying request.
    pub async fn delete(&self, id: &str) -> Result<Value, ApiError> {
        self.api.request(Method::DELETE, &[self.resource.path(), id], &[], None).await
    }
}
