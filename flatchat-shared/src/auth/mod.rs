/// UI-affordance helpers built on the session
///
/// Nothing here is a security boundary. Token issuance and verification
/// belong to the identity provider; ownership is enforced by the server.
///
/// # Modules
///
/// - [`ownership`]: whether to show edit/delete controls for a resource
/// - [`display_name`]: whether a cached display name still needs a lookup

pub mod display_name;
pub mod ownership;

pub use display_name::{EmailOrOpaqueId, NameFreshness};
pub use ownership::can_modify;
