/// Session record and the context derived from it
///
/// The session tier holds one JSON blob under [`SESSION_RECORD_KEY`]:
///
/// ```json
/// {
///   "idToken": "...",
///   "accessToken": "...",
///   "refreshToken": "...",
///   "userID": "u1",
///   "username": "aoife",
///   "householdID": "h1",
///   "Name": "Aoife"
/// }
/// ```
///
/// Every field is optional on the wire. A record is only usable as a
/// [`SessionContext`] when both `userID` and `accessToken` are present; a
/// record with tokens but no `householdID` is a valid "authenticated, not yet
/// household-scoped" session. Unknown keys written by other parts of the app
/// are preserved across merges.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Storage key of the session record
pub const SESSION_RECORD_KEY: &str = "authTokens";

/// Raw session record as persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(rename = "idToken", default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    #[serde(rename = "accessToken", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(rename = "refreshToken", default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    #[serde(rename = "userID", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(rename = "username", default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(rename = "householdID", default, skip_serializing_if = "Option::is_none")]
    pub household_id: Option<String>,

    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Keys this crate does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionRecord {
    /// Applies `patch` field by field; fields the patch leaves unset are kept
    pub fn merge(&mut self, patch: SessionPatch) {
        let SessionPatch {
            id_token,
            access_token,
            refresh_token,
            user_id,
            username,
            household_id,
            display_name,
        } = patch;

        merge_field(&mut self.id_token, id_token);
        merge_field(&mut self.access_token, access_token);
        merge_field(&mut self.refresh_token, refresh_token);
        merge_field(&mut self.user_id, user_id);
        merge_field(&mut self.username, username);
        merge_field(&mut self.household_id, household_id);
        merge_field(&mut self.display_name, display_name);
    }

    /// Builds the working context, or `None` if the record is not authenticated
    pub fn context(&self) -> Option<SessionContext> {
        let user_id = non_blank(self.user_id.as_deref())?;
        let access_token = non_blank(self.access_token.as_deref())?;

        Some(SessionContext {
            user_id: user_id.to_string(),
            username: self.username.clone(),
            tokens: SessionTokens {
                id_token: self.id_token.clone(),
                access_token: access_token.to_string(),
                refresh_token: self.refresh_token.clone(),
            },
            household_id: non_blank(self.household_id.as_deref()).map(str::to_string),
            display_name: self.display_name.clone(),
        })
    }
}

fn merge_field(slot: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        *slot = Some(value);
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Bearer credentials, used verbatim as request headers
///
/// Never parsed or renewed here. `Debug` redacts the values.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub id_token: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// The authenticated client's working identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Stable subject identifier, immutable for the session
    pub user_id: String,

    pub username: Option<String>,

    pub tokens: SessionTokens,

    /// Absent until resolved; authoritative once set
    pub household_id: Option<String>,

    /// Resolved lazily and independently of the household
    pub display_name: Option<String>,
}

impl SessionContext {
    /// Value for the `Authorization` header
    pub fn bearer(&self) -> &str {
        &self.tokens.access_token
    }
}

/// Partial update of the session record
///
/// Only fields set on the patch are written. There is no way to unset a
/// single field; use `SessionStore::clear` to drop the whole record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionPatch {
    pub id_token: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub household_id: Option<String>,
    pub display_name: Option<String>,
}

impl SessionPatch {
    /// Patch carrying a freshly issued login
    pub fn login(
        user_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        SessionPatch {
            user_id: Some(user_id.into()),
            access_token: Some(access_token.into()),
            ..Default::default()
        }
    }

    pub fn household(household_id: impl Into<String>) -> Self {
        SessionPatch {
            household_id: Some(household_id.into()),
            ..Default::default()
        }
    }

    pub fn display_name(name: impl Into<String>) -> Self {
        SessionPatch {
            display_name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_id_token(mut self, token: impl Into<String>) -> Self {
        self.id_token = Some(token.into());
        self
    }

    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_household(mut self, household_id: impl Into<String>) -> Self {
        self.household_id = Some(household_id.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// True if the patch would not change anything
    pub fn is_empty(&self) -> bool {
        *self == SessionPatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_wire_names() {
        let record: SessionRecord = serde_json::from_value(serde_json::json!({
            "idToken": "id",
            "accessToken": "t1",
            "userID": "u1",
            "householdID": "h1",
            "Name": "Aoife",
            "theme": "dark"
        }))
        .unwrap();

        assert_eq!(record.access_token.as_deref(), Some("t1"));
        assert_eq!(record.display_name.as_deref(), Some("Aoife"));
        assert_eq!(record.extra.get("theme"), Some(&Value::from("dark")));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["householdID"], "h1");
        assert_eq!(back["theme"], "dark");
        assert!(back.get("refreshToken").is_none());
    }

    #[test]
    fn test_merge_is_field_level() {
        let mut record = SessionRecord::default();
        record.merge(SessionPatch::login("u1", "t1").with_username("aoife"));
        record.merge(SessionPatch::household("h1"));

        assert_eq!(record.user_id.as_deref(), Some("u1"));
        assert_eq!(record.access_token.as_deref(), Some("t1"));
        assert_eq!(record.username.as_deref(), Some("aoife"));
        assert_eq!(record.household_id.as_deref(), Some("h1"));
    }

    #[test]
    fn test_context_requires_tokens() {
        let mut record = SessionRecord {
            user_id: Some("u1".to_string()),
            ..Default::default()
        };
        assert!(record.context().is_none());

        record.access_token = Some("t1".to_string());
        let context = record.context().unwrap();
        assert_eq!(context.user_id, "u1");
        assert_eq!(context.bearer(), "t1");
        assert!(context.household_id.is_none());
    }

    #[test]
    fn test_blank_household_is_absent() {
        let record = SessionRecord {
            user_id: Some("u1".to_string()),
            access_token: Some("t1".to_string()),
            household_id: Some(String::new()),
            ..Default::default()
        };
        assert!(record.context().unwrap().household_id.is_none());
    }

    #[test]
    fn test_tokens_debug_redacted() {
        let tokens = SessionTokens {
            id_token: None,
            access_token: "secret-token".to_string(),
            refresh_token: Some("refresh".to_string()),
        };
        let printed = format!("{:?}", tokens);
        assert!(!printed.contains("secret-token"));
        assert!(!printed.contains("refresh\""));
    }

    #[test]
    fn test_empty_patch() {
        assert!(SessionPatch::default().is_empty());
        assert!(!SessionPatch::household("h1").is_empty());
    }
}
