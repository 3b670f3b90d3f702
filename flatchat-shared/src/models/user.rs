/// User records returned by the identity and household endpoints
///
/// The identity lookup (`POST <read-user>` with `{UserID}`) returns the whole
/// user document. Only `Name` and `HouseholdID` matter for session
/// resolution; the remaining profile fields are kept for callers that render
/// a profile page.

use serde::{Deserialize, Serialize};

/// Response of the identity lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "UserID", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Friendly display name
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Household the user belongs to, if any
    #[serde(rename = "HouseholdID", default, skip_serializing_if = "Option::is_none")]
    pub household_id: Option<String>,

    #[serde(rename = "Email", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(rename = "College", default, skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,

    #[serde(rename = "AreaOfStudy", default, skip_serializing_if = "Option::is_none")]
    pub area_of_study: Option<String>,

    #[serde(rename = "DoNotDisturb", default)]
    pub do_not_disturb: bool,
}

impl UserRecord {
    /// Household id, ignoring blank values
    pub fn household(&self) -> Option<&str> {
        self.household_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Display name, ignoring blank values
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.trim().is_empty())
    }
}

/// Member entry from the household directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdMember {
    #[serde(rename = "UserID")]
    pub user_id: String,

    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "Email", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
