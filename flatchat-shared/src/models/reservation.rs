/// Shared-space reservation model
///
/// Reservations start in the `Pending` state. Approval is a server-side
/// transition: any household member may approve or reject, and the server
/// records them in `Approvers`. Clients submit a review and refetch; they never
/// set `ApprovalStatus` themselves.

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use super::resource::{HouseholdResource, ResourceFamily};

/// Approval state computed by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ApprovalStatus {
    /// Awaiting review
    #[default]
    Pending,

    /// Approved by a member
    Approved,

    /// Rejected by a member
    Rejected,
}

/// Review decision sent to the approval endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewAction::Approve => write!(f, "Approve"),
            ReviewAction::Reject => write!(f, "Reject"),
        }
    }
}

/// Reservation of a shared space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Reservation {
    #[serde(rename = "ReservationID", default, skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,

    #[serde(rename = "HouseholdID", default)]
    pub household_id: String,

    /// Space being reserved, e.g. "Living Room"
    #[serde(rename = "SpaceName")]
    #[validate(length(min = 1, message = "Space is required."))]
    pub space_name: String,

    /// Member holding the reservation
    #[serde(rename = "ReservedBy")]
    #[validate(length(min = 1, message = "Please select the reserving user."))]
    pub reserved_by: String,

    #[serde(rename = "Purpose", default)]
    pub purpose: String,

    #[serde(rename = "StartTime")]
    #[validate(length(min = 1, message = "Start and End times are required."))]
    pub start_time: String,

    #[serde(rename = "EndTime")]
    #[validate(length(min = 1, message = "Start and End times are required."))]
    pub end_time: String,

    #[serde(rename = "ApprovalStatus", default, skip_serializing_if = "Option::is_none")]
    pub approval_status: Option<ApprovalStatus>,

    #[serde(rename = "Approvers", default, skip_serializing_if = "Vec::is_empty")]
    pub approvers: Vec<String>,

    /// Requesting user, required by the server on full updates
    #[serde(rename = "RequestUserID", default, skip_serializing_if = "Option::is_none")]
    pub request_user_id: Option<String>,
}

impl Reservation {
    /// Creates a new, unsaved reservation
    pub fn new(
        household_id: impl Into<String>,
        space_name: impl Into<String>,
        reserved_by: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Reservation {
            reservation_id: None,
            household_id: household_id.into(),
            space_name: space_name.into(),
            reserved_by: reserved_by.into(),
            purpose: String::new(),
            start_time: start_time.into(),
            end_time: end_time.into(),
            approval_status: None,
            approvers: Vec::new(),
            request_user_id: None,
        }
    }

    /// Effective status, treating a missing field as pending
    pub fn status(&self) -> ApprovalStatus {
        self.approval_status.unwrap_or_default()
    }
}

impl HouseholdResource for Reservation {
    const FAMILY: ResourceFamily = ResourceFamily::Reservation;

    fn id(&self) -> Option<&str> {
        self.reservation_id.as_deref()
    }

    fn household_id(&self) -> &str {
        &self.household_id
    }

    fn set_household_id(&mut self, household_id: &str) {
        self.household_id = household_id.to_string();
    }

    fn owner_id(&self) -> Option<&str> {
        Some(self.reserved_by.as_str())
    }
}
