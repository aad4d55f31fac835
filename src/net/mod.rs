//! HTTP plumbing: the authenticated API client and its collection views.

pub mod api;
pub mod resources;

pub use api::{ApiClient, ApiError};
pub use resources::{Access, Resource, ResourceClient, UnknownResource};
