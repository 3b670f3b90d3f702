/// Social feed comment model
///
/// Comments belong to a post rather than directly to a household, so they
/// are not a `HouseholdResource`: they are listed per post and created
/// through the post's comment endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Comment on a feed post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Comment {
    /// Server-assigned identifier
    #[serde(rename = "CommentID", default, skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<String>,

    #[serde(rename = "PostID")]
    #[validate(length(min = 1, message = "PostID is required."))]
    pub post_id: String,

    /// Author user id
    #[serde(rename = "UserID")]
    #[validate(length(min = 1, message = "UserID is required."))]
    pub user_id: String,

    #[serde(rename = "Content")]
    #[validate(length(min = 1, message = "Comment cannot be empty."))]
    pub content: String,

    #[serde(rename = "CreatedAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Comment {
    /// Creates a new, unsaved comment
    pub fn new(
        post_id: impl Into<String>,
        user_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Comment {
            comment_id: None,
            post_id: post_id.into(),
            user_id: user_id.into(),
            content: content.into(),
            created_at: None,
        }
    }
}
