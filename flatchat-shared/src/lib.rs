//! # Flatchat Shared Library
//!
//! This crate contains the types and client-side state shared by every
//! household feature: the session record and its storage tiers, the resource
//! families (bills, tasks, reservations, shopping lists, notices, posts) and
//! the small UI-affordance helpers built on top of them.
//!
//! ## Module Organization
//!
//! - `models`: Session, user, household and resource-family data structures
//! - `session`: Storage backends and the `SessionStore`
//! - `auth`: Ownership hints and display-name freshness checks

pub mod auth;
pub mod models;
pub mod session;

/// Current version of the Flatchat shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
