//! Reaction domain entity
//!
//! Anonymous reader reactions on a post. The backend keeps, per reaction
//! kind, the list of user ids that reacted.

use serde::{Deserialize, Serialize};

/// Reaction kinds supported by the blog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionType {
    Like,
    Love,
    Wow,
    Sad,
}

impl ReactionType {
    pub const ALL: [ReactionType; 4] = [
        ReactionType::Like,
        ReactionType::Love,
        ReactionType::Wow,
        ReactionType::Sad,
    ];

    /// Get the emoji representation
    pub fn emoji(&self) -> &'static str {
        match self {
            ReactionType::Like => "👍",
            ReactionType::Love => "❤️",
            ReactionType::Wow => "😮",
            ReactionType::Sad => "😢",
        }
    }
}

impl std::fmt::Display for ReactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReactionType::Like => write!(f, "like"),
            ReactionType::Love => write!(f, "love"),
            ReactionType::Wow => write!(f, "wow"),
            ReactionType::Sad => write!(f, "sad"),
        }
    }
}

impl std::str::FromStr for ReactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "like" | "👍" => Ok(ReactionType::Like),
            "love" | "❤️" | "❤" => Ok(ReactionType::Love),
            "wow" | "😮" => Ok(ReactionType::Wow),
            "sad" | "😢" => Ok(ReactionType::Sad),
            _ => Err(format!(
                "Unknown reaction: {}. Use: like, love, wow, sad",
                s
            )),
        }
    }
}

/// User ids per reaction kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reactions {
    pub like: Vec<String>,
    pub love: Vec<String>,
    pub wow: Vec<String>,
    pub sad: Vec<String>,
}

impl Reactions {
    fn users(&self, kind: ReactionType) -> &[String] {
        match kind {
            ReactionType::Like => &self.like,
            ReactionType::Love => &self.love,
            ReactionType::Wow => &self.wow,
            ReactionType::Sad => &self.sad,
        }
    }

    pub fn count(&self, kind: ReactionType) -> usize {
        self.users(kind).len()
    }

    pub fn has_reacted(&self, kind: ReactionType, user_id: &str) -> bool {
        self.users(kind).iter().any(|u| u == user_id)
    }

    /// Reaction kinds the given user currently holds
    pub fn held_by(&self, user_id: &str) -> Vec<ReactionType> {
        ReactionType::ALL
            .into_iter()
            .filter(|kind| self.has_reacted(*kind, user_id))
            .collect()
    }
}

/// Result of toggling a reaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReactionOutcome {
    pub reactions: Reactions,
    pub kind: ReactionType,
    /// Whether the user holds `kind` after the toggle
    pub active: bool,
}
