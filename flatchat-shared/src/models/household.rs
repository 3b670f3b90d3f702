/// Household records
///
/// A household is the tenancy that scopes every shared resource. The client
/// keeps a durable copy of the household id and name across sessions (see
/// `session::SessionStore::durable_household`) and can ask the household
/// service for the join code and admin list.

use serde::{Deserialize, Serialize};

/// Storage key of the durable household id
pub const DURABLE_HOUSEHOLD_ID_KEY: &str = "HouseholdID";

/// Storage key of the durable household name
pub const DURABLE_HOUSEHOLD_NAME_KEY: &str = "HouseholdName";

/// Household summary returned by the household service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdInfo {
    #[serde(rename = "HouseholdID", default, skip_serializing_if = "Option::is_none")]
    pub household_id: Option<String>,

    #[serde(rename = "HouseholdName", default, skip_serializing_if = "Option::is_none")]
    pub household_name: Option<String>,

    /// Short code new members use to join
    #[serde(rename = "JoinCode", default, skip_serializing_if = "Option::is_none")]
    pub join_code: Option<String>,

    /// User ids with admin rights
    #[serde(rename = "Admins", default)]
    pub admins: Vec<String>,
}

impl HouseholdInfo {
    /// Whether `user_id` is listed as an admin
    ///
    /// Used to show or hide admin controls. The household service performs
    /// its own checks on every admin request.
    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admins.iter().any(|admin| admin == user_id)
    }
}

/// Cross-session household record kept in the durable storage tier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DurableHousehold {
    pub household_id: Option<String>,
    pub household_name: Option<String>,
}
