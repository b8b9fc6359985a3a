//! Comment domain entity
//!
//! Reader comments on a post. Comments are anonymous: whoever posts one
//! receives a delete key, and only the holder of that key can remove it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque comment identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub String);

impl CommentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CommentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CommentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A comment, with its replies nested beneath it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id", alias = "id")]
    pub id: CommentId,
    pub author: String,
    pub content: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub reply_to: Option<CommentId>,
    #[serde(default)]
    pub parent_author: Option<String>,
    #[serde(default)]
    pub replies: Vec<Comment>,
    /// Only present in the response to creating the comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_key: Option<String>,
}

impl Comment {
    /// Number of comments in this thread, the comment itself included
    pub fn thread_len(&self) -> usize {
        1 + self.replies.iter().map(Comment::thread_len).sum::<usize>()
    }
}

/// A comment about to be posted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub author: String,
    pub content: String,
    pub reply_to: Option<CommentId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_nested_thread() {
        let json = r#"[{
            "_id": "c1",
            "author": "Ana",
            "content": "Great post",
            "createdAt": "2024-03-01T10:00:00Z",
            "replies": [{
                "_id": "c2",
                "author": "Adela",
                "content": "Thanks!",
                "createdAt": "2024-03-01T11:00:00Z",
                "replyTo": "c1",
                "parentAuthor": "Ana"
            }]
        }]"#;
        let comments: Vec<Comment> = serde_json::from_str(json).unwrap();

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].thread_len(), 2);
        let reply = &comments[0].replies[0];
        assert_eq!(reply.reply_to, Some(CommentId::from("c1")));
        assert_eq!(reply.parent_author.as_deref(), Some("Ana"));
        assert_eq!(reply.delete_key, None);
    }

    #[test]
    fn created_comment_carries_delete_key() {
        let json = r#"{"_id": "c9", "author": "Bo", "content": "Hi", "deleteKey": "k-123"}"#;
        let comment: Comment = serde_json::from_str(json).unwrap();
        assert_eq!(comment.delete_key.as_deref(), Some("k-123"));
        assert!(comment.replies.is_empty());
    }

    #[test]
    fn new_comment_serialization() {
        let comment = NewComment {
            author: "Bo".to_string(),
            content: "Hi".to_string(),
            reply_to: None,
        };
        assert_eq!(
            serde_json::to_string(&comment).unwrap(),
            r#"{"author":"Bo","content":"Hi","replyTo":null}"#
        );
    }
}
