//! Chat messages exchanged about a tool

use serde::{Deserialize, Serialize};

/// One message in a tool's conversation. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,

    #[serde(default)]
    pub tool_id: Option<i64>,

    #[serde(default)]
    pub reservation_id: Option<i64>,

    /// Sender's user id
    #[serde(default, alias = "sender_id")]
    pub user_id: Option<i64>,

    /// Sender display name, when the backend includes it
    #[serde(default)]
    pub sender: Option<String>,

    pub message: String,

    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
}

impl ChatMessage {
    pub fn is_from(&self, user_id: i64) -> bool {
        self.user_id == Some(user_id)
    }
}

/// Body for `POST /chats`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewChatMessage {
    pub tool_id: i64,
    pub message: String,
}
