/// Social feed post model
///
/// Posts carry a location and a geofence radius in metres. Distance filtering
/// happens on the server; the client only supplies the fields.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use super::resource::{HouseholdResource, ResourceFamily};

/// Default geofence radius applied by the server when none is sent
pub const DEFAULT_GEOFENCE_RADIUS_M: f64 = 500.0;

/// Social feed post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_location"))]
pub struct Post {
    #[serde(rename = "PostID", default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,

    #[serde(rename = "HouseholdID", default)]
    pub household_id: String,

    /// Author user id
    #[serde(rename = "UserID")]
    #[validate(length(min = 1, message = "UserID is required."))]
    pub user_id: String,

    /// Author display name (server filled)
    #[serde(rename = "UserName", default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    #[serde(rename = "Content")]
    #[validate(length(min = 1, message = "Content is required."))]
    pub content: String,

    #[serde(rename = "Tags", default)]
    pub tags: Vec<String>,

    #[serde(rename = "Latitude")]
    pub latitude: f64,

    #[serde(rename = "Longitude")]
    pub longitude: f64,

    #[serde(rename = "GeofenceRadius", default = "default_radius")]
    pub geofence_radius: f64,

    #[serde(rename = "CreatedAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(rename = "Likes", default)]
    pub likes: u64,
}

fn default_radius() -> f64 {
    DEFAULT_GEOFENCE_RADIUS_M
}

fn validate_location(post: &Post) -> Result<(), ValidationError> {
    let message = if !(-90.0..=90.0).contains(&post.latitude) {
        "Latitude out of range."
    } else if !(-180.0..=180.0).contains(&post.longitude) {
        "Longitude out of range."
    } else if !(post.geofence_radius >= 0.0) {
        "Geofence radius must not be negative."
    } else {
        return Ok(());
    };

    let mut error = ValidationError::new("location");
    error.message = Some(Cow::Borrowed(message));
    Err(error)
}

impl Post {
    /// Creates a new, unsaved post at the given location
    pub fn new(
        household_id: impl Into<String>,
        user_id: impl Into<String>,
        content: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Post {
            post_id: None,
            household_id: household_id.into(),
            user_id: user_id.into(),
            user_name: None,
            content: content.into(),
            tags: Vec::new(),
            latitude,
            longitude,
            geofence_radius: DEFAULT_GEOFENCE_RADIUS_M,
            created_at: None,
            likes: 0,
        }
    }
}

impl HouseholdResource for Post {
    const FAMILY: ResourceFamily = ResourceFamily::Post;

    fn id(&self) -> Option<&str> {
        self.post_id.as_deref()
    }

    fn household_id(&self) -> &str {
        &self.household_id
    }

    fn set_household_id(&mut self, household_id: &str) {
        self.household_id = household_id.to_string();
    }

    fn owner_id(&self) -> Option<&str> {
        Some(self.user_id.as_str())
    }
}
