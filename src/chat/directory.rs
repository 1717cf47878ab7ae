// Conversation directory: the registry of known private and group chats.

use anyhow::Result;
use log::debug;

use super::seed;
use crate::models::{Conversation, ConversationKind};

/// Read-only registry of the conversations the client knows about. The
/// chat core never writes to it; conversations opened by an identifier
/// that is not listed here get a transient record from the resolver
/// instead (see `resolver::resolve`).
pub struct ConversationDirectory {
    conversations: Vec<Conversation>,
}

impl ConversationDirectory {
    /// Build the directory from the embedded seed data.
    pub fn from_seed() -> Result<Self> {
        let conversations = seed::seed_conversations()?;
        debug!("loaded {} conversations from seed", conversations.len());
        Ok(Self { conversations })
    }

    /// Build a directory from explicit records, in the given order.
    pub fn from_conversations(conversations: Vec<Conversation>) -> Self {
        Self { conversations }
    }

    /// All conversations, optionally filtered by kind. Directory insertion
    /// order is preserved either way.
    pub fn list(&self, filter: Option<ConversationKind>) -> Vec<&Conversation> {
        self.conversations
            .iter()
            .filter(|c| filter.map_or(true, |kind| c.kind == kind))
            .collect()
    }

    /// Look up a conversation by directory id. Identifiers can arrive as
    /// route parameters that went through string coercion, so the match
    /// trims whitespace and ignores case.
    pub fn find_by_id(&self, id: &str) -> Option<&Conversation> {
        let wanted = id.trim();
        self.conversations
            .iter()
            .find(|c| c.id.eq_ignore_ascii_case(wanted))
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}
