//! # Flatchat Client Library
//!
//! Household-scoped data access for the Flatchat pages: identity
//! resolution, the uniform CRUD contract of every resource family, and the
//! write-then-refetch coordination each page runs its mutations through.
//!
//! ## Modules
//!
//! - `config`: Endpoint configuration loaded from the environment
//! - `transport`: HTTP transport trait plus reqwest and mock implementations
//! - `identity`: Household and display-name resolution with caching
//! - `resource`: Typed CRUD client per resource family
//! - `coordinator`: `{loading, error, data}` state with refetch after writes
//! - `household`: Household info and member directory
//! - `error`: Identity and resource error types
//!
//! ## Example
//!
//! ```no_run
//! use flatchat_client::config::ClientConfig;
//! use flatchat_client::identity::IdentityResolver;
//! use flatchat_client::transport::ReqwestTransport;
//! use flatchat_shared::session::SessionStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let store = Arc::new(SessionStore::open(&config.state_dir));
//! let transport = Arc::new(ReqwestTransport::new(config.request_timeout())?);
//! let resolver = IdentityResolver::new(store, transport, config.read_user_endpoint()?);
//!
//! let identity = resolver.resolve_context().await?;
//! println!("{} in {}", identity.user_id, identity.household_id);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod household;
pub mod identity;
pub mod resource;
pub mod transport;
