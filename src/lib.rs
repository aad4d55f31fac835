//! Hop4Deals back-office access layer.
//!
//! Session state, role/privilege policy, route guarding, sidebar composition
//! and the authenticated REST client for the Hop4Deals deals platform.

pub mod app;
pub mod auth;
pub mod config;
pub mod net;
pub mod router;
pub mod storage;

pub use app::App;
pub use config::Config;
