//! Memory record model used by the conversation buffers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque sender identifier supplied by the messaging platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Who produced a remembered turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryRole {
    /// Inbound message from the user.
    User,
    /// Generated reply.
    Assistant,
}

impl MemoryRole {
    /// Lower-case label used when rendering transcripts.
    pub fn as_str(self) -> &'static str {
        match self {
            MemoryRole::User => "user",
            MemoryRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MemoryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One remembered conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    /// Record identifier.
    pub id: Uuid,
    /// Role of the turn.
    pub role: MemoryRole,
    /// Turn content.
    pub content: String,
    /// Sender the turn belongs to.
    pub user_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl MemoryRecord {
    /// Create a record stamped with the current time.
    pub fn new(role: MemoryRole, content: impl Into<String>, user_id: UserId) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            user_id,
            created_at: Utc::now(),
        }
    }

    /// Render the record as a single transcript line.
    pub fn transcript_line(&self) -> String {
        format!("{}: {}", self.role, self.content)
    }
}
