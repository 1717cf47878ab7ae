// Seed data for the demo deployment. Conversations and transcripts ship
// embedded in the binary; there is no backend to fetch them from.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

use crate::models::{Conversation, ConversationKind, Member, Message};

const CONVERSATIONS_JSON: &str = include_str!("../../seed/conversations.json");
const MESSAGES_JSON: &str = include_str!("../../seed/messages.json");

/// One directory seed entry. The conversation id is the key of the
/// enclosing JSON object, so it is not part of the record itself.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConversationSeed {
    name: String,
    avatar_glyph: String,
    #[serde(default)]
    last_message_preview: String,
    #[serde(default)]
    timestamp_label: String,
    #[serde(default)]
    unread: bool,
    #[serde(default)]
    unread_count: u32,
    kind: ConversationKind,
    #[serde(default)]
    members: Vec<Member>,
}

/// Parse the embedded directory seed, preserving the order conversations
/// are listed in (the chat list renders them in this order).
pub fn seed_conversations() -> Result<Vec<Conversation>> {
    let map: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(CONVERSATIONS_JSON).context("conversation seed is not valid JSON")?;

    let mut conversations = Vec::with_capacity(map.len());
    for (id, value) in map {
        let seed: ConversationSeed = serde_json::from_value(value)
            .with_context(|| format!("invalid directory seed entry for conversation {}", id))?;
        conversations.push(Conversation {
            id,
            name: seed.name,
            avatar_glyph: seed.avatar_glyph,
            kind: seed.kind,
            last_message_preview: seed.last_message_preview,
            timestamp_label: seed.timestamp_label,
            unread: seed.unread,
            unread_count: seed.unread_count,
            members: seed.members,
        });
    }
    Ok(conversations)
}

/// Parse the embedded message seed: conversation key -> ordered transcript.
pub fn seed_transcripts() -> Result<HashMap<String, Vec<Message>>> {
    serde_json::from_str(MESSAGES_JSON).context("message seed is not valid JSON")
}
