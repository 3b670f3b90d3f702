/// Bill model
///
/// A bill is split between a set of household members. The server computes
/// the equal `Splits` on create when none are supplied and keeps the
/// `PaidMembers` set, so the client never derives either locally: it sends a
/// full replacement and refetches.
///
/// # Wire Format
///
/// ```json
/// {
///   "BillID": "b1",
///   "HouseholdID": "h1",
///   "Title": "Rent",
///   "Description": "March",
///   "TotalAmount": "1200.00",
///   "DueBy": "2025-03-01",
///   "Members": ["u1", "u2"],
///   "Splits": [{"UserID": "u1", "Share": 600.0, "Paid": false}],
///   "PaidMembers": []
/// }
/// ```

use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use super::resource::{HouseholdResource, ResourceFamily};

/// One member's share of a bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    /// Member responsible for this share
    #[serde(rename = "UserID")]
    pub user_id: String,

    /// Amount owed
    #[serde(rename = "Share", default)]
    pub share: f64,

    /// Whether the share has been paid
    #[serde(rename = "Paid", default)]
    pub paid: bool,
}

/// Shared household bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Bill {
    /// Server-assigned identifier
    #[serde(rename = "BillID", default, skip_serializing_if = "Option::is_none")]
    pub bill_id: Option<String>,

    /// Owning household
    #[serde(rename = "HouseholdID", default)]
    pub household_id: String,

    /// Short title shown in the list
    #[serde(rename = "Title")]
    #[validate(length(min = 1, message = "Title is required."))]
    pub title: String,

    #[serde(rename = "Description", default)]
    pub description: String,

    /// Total amount as entered; the server may echo it as a number
    #[serde(rename = "TotalAmount", deserialize_with = "string_or_number")]
    #[validate(custom(function = "validate_amount"))]
    pub total_amount: String,

    #[serde(rename = "DueBy", default, skip_serializing_if = "Option::is_none")]
    pub due_by: Option<String>,

    /// Members the bill is split between
    #[serde(rename = "Members", default)]
    #[validate(length(min = 1, message = "Please select at least one member."))]
    pub members: Vec<String>,

    /// Per-member shares (server computed)
    #[serde(rename = "Splits", default, skip_serializing_if = "Vec::is_empty")]
    pub splits: Vec<Split>,

    /// Members who have paid (server maintained)
    #[serde(rename = "PaidMembers", default)]
    pub paid_members: Vec<String>,

    /// Creator of the bill
    #[serde(rename = "CreatedBy", default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    /// Receipt image uploaded by the server
    #[serde(rename = "ImageURL", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Bill {
    /// Creates a new, unsaved bill
    pub fn new(
        household_id: impl Into<String>,
        title: impl Into<String>,
        total_amount: impl Into<String>,
        members: Vec<String>,
    ) -> Self {
        Bill {
            bill_id: None,
            household_id: household_id.into(),
            title: title.into(),
            description: String::new(),
            total_amount: total_amount.into(),
            due_by: None,
            members,
            splits: Vec::new(),
            paid_members: Vec::new(),
            created_by: None,
            image_url: None,
        }
    }

    /// Returns the full replacement object with `user_id` marked paid or unpaid
    ///
    /// The result is meant for a full-object update followed by a refetch;
    /// the local copy is not modified.
    pub fn with_payment(&self, user_id: &str, paid: bool) -> Self {
        let mut updated = self.clone();
        updated.paid_members.retain(|member| member != user_id);
        if paid {
            updated.paid_members.push(user_id.to_string());
        }
        for split in updated.splits.iter_mut().filter(|s| s.user_id == user_id) {
            split.paid = paid;
        }
        updated
    }

    /// Whether `user_id` has paid their share
    pub fn is_paid_by(&self, user_id: &str) -> bool {
        self.paid_members.iter().any(|member| member == user_id)
    }

    /// Members who have not paid yet
    pub fn outstanding_members(&self) -> Vec<&str> {
        self.members
            .iter()
            .filter(|member| !self.is_paid_by(member))
            .map(String::as_str)
            .collect()
    }
}

impl HouseholdResource for Bill {
    const FAMILY: ResourceFamily = ResourceFamily::Bill;

    fn id(&self) -> Option<&str> {
        self.bill_id.as_deref()
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

fn validate_amount(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    let mut error = ValidationError::new("total_amount");
    if trimmed.is_empty() {
        error.message = Some(Cow::Borrowed("Total Amount is required."));
        return Err(error);
    }
    match trimmed.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => Ok(()),
        _ => {
            error.message = Some(Cow::Borrowed("Total Amount must be a positive number."));
            Err(error)
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Amount::deserialize(deserializer)? {
        Amount::Text(text) => text,
        Amount::Number(number) => number.to_string(),
    })
}
