/// Chore model for the cleaning rota

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::resource::{HouseholdResource, ResourceFamily};

/// Household chore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Task {
    /// Server-assigned identifier
    #[serde(rename = "TaskID", default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    /// Owning household
    #[serde(rename = "HouseholdID", default)]
    pub household_id: String,

    #[serde(rename = "Title")]
    #[validate(length(min = 1, message = "Title is required."))]
    pub title: String,

    /// Member (or "Everyone") the chore is assigned to
    #[serde(rename = "AssignedTo", default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,

    /// Free-form recurrence such as "Rotates Weekly"
    #[serde(rename = "Frequency", default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,

    #[serde(rename = "DueDate", default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,

    #[serde(rename = "Completed", default)]
    pub completed: bool,

    #[serde(rename = "CreatedBy", default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Task {
    /// Creates a new, unsaved chore
    pub fn new(household_id: impl Into<String>, title: impl Into<String>) -> Self {
        Task {
            task_id: None,
            household_id: household_id.into(),
            title: title.into(),
            assigned_to: None,
            frequency: None,
            due_date: None,
            completed: false,
            created_by: None,
        }
    }

    /// Full replacement object with the completion flag set
    pub fn with_completed(&self, completed: bool) -> Self {
        Task {
            completed,
            ..self.clone()
        }
    }
}

impl HouseholdResource for Task {
    const FAMILY: ResourceFamily = ResourceFamily::Task;

    fn id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    fn household_id(&self) -> &str {
        &self.household_id
    }

    fn set_household_id(&mut self, household_id: &str) {
        self.household_id = household_id.to_string();
    }

    fn owner_id(&self) -> Option<&str> {
        self.created_by.as_deref()
    }
}
