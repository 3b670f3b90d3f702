/// Error taxonomy of the client
///
/// Errors are recovered at the page (or command) boundary: the caller turns
/// them into a message via [`ResourceError::user_message`] or the `Display`
/// impl. None are retried automatically and there is no token refresh on an
/// authentication failure.

use thiserror::Error;
use validator::ValidationErrors;

use crate::transport::TransportError;

/// Identity resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// No usable session tokens; the caller must send the user to sign in
    #[error("Not signed in")]
    Unauthenticated,

    /// Signed in, but the household is unknown (lookup failed or the user
    /// has not joined one)
    #[error("No household found for this account")]
    HouseholdUnresolved,
}

/// Result type for identity operations
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Errors from household-scoped resource calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// Payload rejected before any request was sent
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Non-success HTTP status
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Body did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Request never produced a response
    #[error("Network error: {0}")]
    Network(String),
}

/// Result type for resource operations
pub type ResourceResult<T> = Result<T, ResourceError>;

impl ResourceError {
    /// Text suitable for inline display to the user
    ///
    /// Server errors show the server's own message verbatim.
    pub fn user_message(&self) -> String {
        match self {
            ResourceError::Validation(message) => message.clone(),
            ResourceError::Server { message, .. } => message.clone(),
            ResourceError::MalformedResponse(_) => {
                "Unexpected response from the server.".to_string()
            }
            ResourceError::Network(_) => {
                "Could not reach the server. Please try again.".to_string()
            }
        }
    }

    /// HTTP status for server errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ResourceError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<TransportError> for ResourceError {
    fn from(err: TransportError) -> Self {
        ResourceError::Network(err.to_string())
    }
}

impl From<ValidationErrors> for ResourceError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| match &err.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid.", field),
                })
            })
            .collect();

        // Struct-level checks are reported under `__all__`.
        if messages.is_empty() {
            messages.push(errors.to_string());
        }
        messages.sort();
        ResourceError::Validation(messages.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatchat_shared::models::{Bill, Notice};
    use validator::Validate;

    #[test]
    fn test_user_message_uses_server_text() {
        let err = ResourceError::Server {
            status: 404,
            message: "not found".to_string(),
        };
        assert_eq!(err.user_message(), "not found");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Server error (404): not found");
    }

    #[test]
    fn test_validation_errors_collect_messages() {
        let err: ResourceError = Notice::new("h1", "", "").validate().unwrap_err().into();
        assert_eq!(
            err,
            ResourceError::Validation("Content is required. Title is required.".to_string())
        );
    }

    #[test]
    fn test_bill_without_members() {
        let err: ResourceError = Bill::new("h1", "Rent", "1200", Vec::new())
            .validate()
            .unwrap_err()
            .into();
        assert_eq!(err.user_message(), "Please select at least one member.");
    }

    #[test]
    fn test_transport_error_is_network() {
        let err: ResourceError = TransportError::Connection("refused".to_string()).into();
        assert!(matches!(err, ResourceError::Network(_)));
    }
}
