/// Noticeboard model
///
/// `CreatedBy` holds the author's display name for rendering; the author's
/// user id is kept separately in `CreatedByID` for edit/delete affordances.
/// `CreatedAt` is stamped by the server on create and preserved on update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::resource::{HouseholdResource, ResourceFamily};

/// Household notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Notice {
    #[serde(rename = "NoticeID", default, skip_serializing_if = "Option::is_none")]
    pub notice_id: Option<String>,

    #[serde(rename = "HouseholdID", default)]
    pub household_id: String,

    #[serde(rename = "Title")]
    #[validate(length(min = 1, message = "Title is required."))]
    pub title: String,

    #[serde(rename = "Content")]
    #[validate(length(min = 1, message = "Content is required."))]
    pub content: String,

    /// Author display name
    #[serde(rename = "CreatedBy", default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    /// Author user id
    #[serde(rename = "CreatedByID", default, skip_serializing_if = "Option::is_none")]
    pub created_by_id: Option<String>,

    #[serde(rename = "CreatedAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Notice {
    /// Creates a new, unsaved notice
    pub fn new(
        household_id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Notice {
            notice_id: None,
            household_id: household_id.into(),
            title: title.into(),
            content: content.into(),
            created_by: None,
            created_by_id: None,
            created_at: None,
        }
    }

    /// Parsed creation time, if the server stamped a valid RFC 3339 value
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.created_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl HouseholdResource for Notice {
    const FAMILY: ResourceFamily = ResourceFamily::Notice;

    fn id(&self) -> Option<&str> {
        self.notice_id.as_deref()
    }

    fn household_id(&self) -> &str {
        &self.household_id
    }

    fn set_household_id(&mut self, household_id: &str) {
        self.household_id = household_id.to_string();
    }

    fn owner_id(&self) -> Option<&str> {
        self.created_by_id.as_deref()
    }
}
