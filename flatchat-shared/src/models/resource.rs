/// Household-scoped resource families
///
/// Every shared entity in a household (bills, chores, reservations, shopping
/// lists, notices, posts) follows the same synchronization contract:
///
/// - it is bound to exactly one household through its `HouseholdID` field
/// - its `id` is assigned by the server on create
/// - it is replaced wholesale on update (there is no partial-patch contract)
/// - it is never deleted locally; a delete is a server round trip followed by
///   a refetch of the collection
///
/// # Wire Shape
///
/// ```text
/// GET    <base>/<path>?HouseholdID=<id>                 -> { <collection_key>: [..] }
/// GET    <base>/<path>/<id>?HouseholdID=<id>            -> resource
/// POST   <base>/<path>            (body has HouseholdID) -> resource
/// PUT    <base>/<path>/<id>?HouseholdID=<id>            -> resource
/// DELETE <base>/<path>/<id>?HouseholdID=<id>&UserID=<u> -> {} | { message }
/// ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// One of the uniform CRUD entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceFamily {
    /// Shared bills with member splits
    Bill,

    /// Chores on the cleaning rota
    Task,

    /// Shared-space reservations
    Reservation,

    /// Shopping lists and their products
    ShoppingList,

    /// Noticeboard entries
    Notice,

    /// Social feed posts
    Post,
}

impl ResourceFamily {
    /// All families, in navigation order
    pub const ALL: [ResourceFamily; 6] = [
        ResourceFamily::Bill,
        ResourceFamily::Task,
        ResourceFamily::Reservation,
        ResourceFamily::ShoppingList,
        ResourceFamily::Notice,
        ResourceFamily::Post,
    ];

    /// Collection path segment under the family's base URL
    pub fn path(&self) -> &'static str {
        match self {
            ResourceFamily::Bill => "bills",
            ResourceFamily::Task => "tasks",
            ResourceFamily::Reservation => "reservations",
            ResourceFamily::ShoppingList => "shopping-lists",
            ResourceFamily::Notice => "notices",
            ResourceFamily::Post => "posts",
        }
    }

    /// Key of the array inside a successful list response
    pub fn collection_key(&self) -> &'static str {
        match self {
            ResourceFamily::Bill => "bills",
            ResourceFamily::Task => "tasks",
            ResourceFamily::Reservation => "reservations",
            ResourceFamily::ShoppingList => "shoppingLists",
            ResourceFamily::Notice => "notices",
            ResourceFamily::Post => "posts",
        }
    }

    /// Name of the server-assigned identifier field
    pub fn id_field(&self) -> &'static str {
        match self {
            ResourceFamily::Bill => "BillID",
            ResourceFamily::Task => "TaskID",
            ResourceFamily::Reservation => "ReservationID",
            ResourceFamily::ShoppingList => "ListID",
            ResourceFamily::Notice => "NoticeID",
            ResourceFamily::Post => "PostID",
        }
    }

    /// Converts family to its snake_case name
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceFamily::Bill => "bill",
            ResourceFamily::Task => "task",
            ResourceFamily::Reservation => "reservation",
            ResourceFamily::ShoppingList => "shopping_list",
            ResourceFamily::Notice => "notice",
            ResourceFamily::Post => "post",
        }
    }

    /// Parses a family from its name, path segment or plural
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        ResourceFamily::ALL.into_iter().find(|family| {
            normalized == family.as_str()
                || normalized == family.path().replace('-', "_")
                || normalized == format!("{}s", family.as_str())
        })
    }
}

impl fmt::Display for ResourceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common contract of every household-scoped entity
///
/// Implementors are plain serde structs whose field names follow the wire
/// format. `Validate` covers the non-empty-field checks a form performs
/// before submitting.
pub trait HouseholdResource:
    Serialize + DeserializeOwned + Validate + Clone + fmt::Debug + Send + Sync + 'static
{
    /// Family this type belongs to
    const FAMILY: ResourceFamily;

    /// Server-assigned identifier, absent until created
    fn id(&self) -> Option<&str>;

    /// Household that owns this resource
    fn household_id(&self) -> &str;

    /// Rebinds the resource to a household
    fn set_household_id(&mut self, household_id: &str);

    /// User who created the resource, when the family records one
    fn owner_id(&self) -> Option<&str>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_paths_and_keys() {
        assert_eq!(ResourceFamily::ShoppingList.path(), "shopping-lists");
        assert_eq!(ResourceFamily::ShoppingList.collection_key(), "shoppingLists");
        assert_eq!(ResourceFamily::Bill.id_field(), "BillID");
        assert_eq!(ResourceFamily::Post.collection_key(), "posts");
    }

    #[test]
    fn test_family_parse() {
        assert_eq!(ResourceFamily::parse("bills"), Some(ResourceFamily::Bill));
        assert_eq!(ResourceFamily::parse("Bill"), Some(ResourceFamily::Bill));
        assert_eq!(
            ResourceFamily::parse("shopping-lists"),
            Some(ResourceFamily::ShoppingList)
        );
        assert_eq!(
            ResourceFamily::parse("shopping_list"),
            Some(ResourceFamily::ShoppingList)
        );
        assert_eq!(ResourceFamily::parse("notices"), Some(ResourceFamily::Notice));
        assert_eq!(ResourceFamily::parse("chores"), None);
    }

    #[test]
    fn test_family_display() {
        assert_eq!(ResourceFamily::Reservation.to_string(), "reservation");
        assert_eq!(ResourceFamily::ShoppingList.to_string(), "shopping_list");
    }
}
