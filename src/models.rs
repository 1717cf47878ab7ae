use serde::{Deserialize, Serialize};

/// Id of the locally signed-in user, as used throughout the seed data.
pub const LOCAL_USER_ID: &str = "current-user";

/// Content label carried by every image message.
pub const IMAGE_CONTENT_LABEL: &str = "Image";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    Private,
    Group,
}

/// A group chat participant. Used for per-message sender attribution;
/// private conversations carry no members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    pub avatar_glyph: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub id: String,
    pub name: String,
    pub avatar_glyph: String,
    pub kind: ConversationKind,
    pub last_message_preview: String,
    pub timestamp_label: String,
    pub unread: bool,
    pub unread_count: u32,
    pub members: Vec<Member>,
}

impl Conversation {
    pub fn is_group(&self) -> bool {
        self.kind == ConversationKind::Group
    }

    /// Look up a group member by participant id.
    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
}

/// One entry in a conversation transcript. The serde names match the seed
/// data format (`senderId`, `receiverId`, `type`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    #[serde(rename = "receiverId")]
    pub recipient_id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Locale hour:minute for live messages, or a precomputed relative
    /// label ("Yesterday", "2 hours ago") for seeded history.
    pub timestamp_label: String,
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Message {
    pub fn is_local(&self) -> bool {
        self.sender_id == LOCAL_USER_ID
    }
}

/// The pseudo-recipient id carried by a message addressed to a group.
pub fn group_recipient(conversation_key: &str) -> String {
    format!("group:{}", conversation_key)
}
