// Message store: conversation key -> ordered transcript.

use anyhow::Result;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use super::seed;
use crate::models::Message;

struct StoreInner {
    transcripts: HashMap<String, Vec<Message>>,
    // Keys that had history at construction time. The delivery simulator
    // uses this to tell real contacts from ad-hoc conversations; our own
    // appends must not change the answer.
    seeded: HashSet<String>,
}

/// Shared, clone-cheap handle to every conversation transcript. Appends to
/// one key never touch another, and each append is atomic under the lock,
/// so interleaved timer callbacks and user sends are observed in the order
/// they were issued.
#[derive(Clone)]
pub struct MessageStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl MessageStore {
    /// A store preloaded with the embedded seed transcripts.
    pub fn from_seed() -> Result<Self> {
        Ok(Self::with_transcripts(seed::seed_transcripts()?))
    }

    /// A store with no history at all. Every key behaves as an empty
    /// conversation.
    pub fn empty() -> Self {
        Self::with_transcripts(HashMap::new())
    }

    /// A store preloaded with the given transcripts, all marked as seeded.
    pub fn with_transcripts(transcripts: HashMap<String, Vec<Message>>) -> Self {
        let seeded = transcripts
            .iter()
            .filter(|(_, history)| !history.is_empty())
            .map(|(key, _)| key.clone())
            .collect();
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                transcripts,
                seeded,
            })),
        }
    }

    /// The current transcript for a key. Unknown keys are empty
    /// conversations, not errors: deep-linked ad-hoc chats start blank.
    pub fn load(&self, conversation_key: &str) -> Vec<Message> {
        let inner = self.inner.lock().unwrap();
        inner
            .transcripts
            .get(conversation_key)
            .cloned()
            .unwrap_or_default()
    }

    /// Append a message to the end of one conversation's transcript.
    pub fn append(&self, conversation_key: &str, message: Message) {
        let mut inner = self.inner.lock().unwrap();
        debug!(
            "appending message {} from {} to transcript {}",
            message.id, message.sender_id, conversation_key
        );
        inner
            .transcripts
            .entry(conversation_key.to_string())
            .or_default()
            .push(message);
    }

    /// Whether the key had seeded history when the store was built.
    pub fn has_seeded_history(&self, conversation_key: &str) -> bool {
        self.inner.lock().unwrap().seeded.contains(conversation_key)
    }

    /// Current transcript length for a key without cloning the messages.
    pub fn transcript_len(&self, conversation_key: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .transcripts
            .get(conversation_key)
            .map_or(0, Vec::len)
    }
}
