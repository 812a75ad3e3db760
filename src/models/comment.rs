//! Comment model for MR discussions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review comment on a merge request, optionally anchored to a file line.
///
/// Comments are append-only: never edited, never removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,

    /// Comment author's display name.
    pub author: String,
    pub author_avatar: String,

    /// Comment content (Markdown).
    pub content: String,

    pub created_at: DateTime<Utc>,

    /// Code change ID for inline comments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,

    /// Diff line for inline comments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
}

impl Comment {
    /// Check if this is an inline comment (associated with a file).
    pub fn is_inline(&self) -> bool {
        self.file_id.is_some()
    }
}

/// Data required to create a new comment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
}

/// Result of adding a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResult {
    pub success: bool,
    pub comment: Comment,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_comment(file_id: Option<&str>) -> Comment {
        Comment {
            id: "comment-1".to_string(),
            author: "DragonSlayer".to_string(),
            author_avatar: "🔮".to_string(),
            content: "Consider token expiration".to_string(),
            created_at: Utc::now(),
            file_id: file_id.map(String::from),
            line_number: file_id.map(|_| 32),
        }
    }

    #[test]
    fn test_is_inline() {
        assert!(make_comment(Some("cc-1")).is_inline());
        assert!(!make_comment(None).is_inline());
    }

    #[test]
    fn test_anchor_omitted_when_general() {
        let json = serde_json::to_string(&make_comment(None)).unwrap();
        assert!(!json.contains("fileId"));
        assert!(!json.contains("lineNumber"));
        assert!(json.contains("\"authorAvatar\""));
    }
}
