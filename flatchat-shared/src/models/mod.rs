/// Data models shared by the Flatchat client
///
/// # Models
///
/// - `session`: The per-login session record and the context derived from it
/// - `user`: Identity lookup result and household members
/// - `household`: Household summary and the durable household record
/// - `resource`: The `HouseholdResource` contract and `ResourceFamily`
/// - `bill`, `task`, `reservation`, `shopping_list`, `notice`, `post`:
///   the resource families
/// - `comment`: Comments on feed posts
///
/// # Example
///
/// ```
/// use flatchat_shared::models::{Bill, HouseholdResource, ResourceFamily};
///
/// let bill = Bill::new("h1", "Electricity", "84.20", vec!["u1".to_string()]);
/// assert_eq!(<Bill as HouseholdResource>::FAMILY, ResourceFamily::Bill);
/// assert!(bill.id().is_none());
/// ```

pub mod bill;
pub mod comment;
pub mod household;
pub mod notice;
pub mod post;
pub mod reservation;
pub mod resource;
pub mod session;
pub mod shopping_list;
pub mod task;
pub mod user;

pub use bill::{Bill, Split};
pub use comment::Comment;
pub use household::{DurableHousehold, HouseholdInfo};
pub use notice::Notice;
pub use post::Post;
pub use reservation::{ApprovalStatus, Reservation, ReviewAction};
pub use resource::{HouseholdResource, ResourceFamily};
pub use session::{SessionContext, SessionPatch, SessionRecord};
pub use shopping_list::{Product, ShoppingList};
pub use task::Task;
pub use user::{HouseholdMember, UserRecord};
