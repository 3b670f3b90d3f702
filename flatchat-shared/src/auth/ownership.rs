/// Ownership affordance
///
/// `can_modify` decides whether a page should offer edit and delete controls.
/// It is a UI hint only: the server receives the requesting `UserID` with
/// every delete and verifies ownership itself, so a false positive here
/// surfaces as a server error and a false negative merely hides a button.

use crate::models::resource::HouseholdResource;

/// Whether `user_id` should be offered edit/delete controls for `resource`
///
/// Resources whose family does not record an owner are modifiable by any
/// household member.
pub fn can_modify<R: HouseholdResource>(resource: &R, user_id: &str) -> bool {
    match resource.owner_id() {
        Some(owner) if !owner.is_empty() => owner == user_id,
        _ => true,
    }
}
