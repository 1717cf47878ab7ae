// Chat session core.
//
// One ChatSession per open conversation: it resolves the identity, loads
// the transcript, runs the delivery simulator, and takes locally composed
// messages. The rendering layer only ever observes the session's
// transcript; it never writes to the store directly.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Local;
use log::{debug, info};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::mpsc;

pub mod directory;
pub mod resolver;
pub mod seed;
pub mod simulator;
pub mod store;

pub use directory::ConversationDirectory;
pub use simulator::{DeliverySimulator, SimulatorConfig, SIMULATED_PHRASES};
pub use store::MessageStore;

use crate::models::{
    group_recipient, Conversation, Message, MessageKind, IMAGE_CONTENT_LABEL, LOCAL_USER_ID,
};

/// Label rendered for a group message whose sender is not in the
/// membership list.
pub const UNKNOWN_SENDER_LABEL: &str = "unknown sender";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Initial transcript is being read from the store.
    Loading,
    /// Transcript is live; sends and simulated deliveries are accepted.
    Active,
    /// Terminal: the session was opened without an identifier.
    NotFound,
    /// Terminal: `close` was called.
    Closed,
}

/// How a message should be attributed when the transcript is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct SenderLabel {
    pub name: String,
    pub avatar_glyph: String,
    pub is_local: bool,
}

pub struct ChatSession {
    conversation: Option<Conversation>,
    conversation_key: Option<String>,
    store: MessageStore,
    transcript: Vec<Message>,
    state: SessionState,
    simulator: DeliverySimulator,
    inbound_rx: mpsc::Receiver<Message>,
    // Keeps the channel open even when the simulator never spawned, so
    // awaiting on an idle session parks instead of returning.
    _inbound_tx: mpsc::Sender<Message>,
}

impl ChatSession {
    /// Open a session with the default simulator timing.
    pub fn open(
        identifier: Option<&str>,
        directory: &ConversationDirectory,
        store: MessageStore,
    ) -> Self {
        Self::open_with_config(identifier, directory, store, SimulatorConfig::default())
    }

    /// Open a session for the conversation `identifier` resolves to.
    ///
    /// No identifier at all (no list selection, no deep-link parameter)
    /// lands in the terminal `NotFound` state: nothing to resolve, no
    /// store access, no simulator. Every other identifier produces an
    /// active session, synthesizing a transient conversation when the
    /// directory has no match.
    pub fn open_with_config(
        identifier: Option<&str>,
        directory: &ConversationDirectory,
        store: MessageStore,
        config: SimulatorConfig,
    ) -> Self {
        let (tx, rx) = mpsc::channel(16);
        let simulator = DeliverySimulator::new(config);

        let identifier = identifier.map(str::trim).filter(|id| !id.is_empty());
        let Some(identifier) = identifier else {
            debug!("chat opened without an identifier");
            return Self {
                conversation: None,
                conversation_key: None,
                store,
                transcript: Vec::new(),
                state: SessionState::NotFound,
                simulator,
                inbound_rx: rx,
                _inbound_tx: tx,
            };
        };

        let conversation = resolver::resolve(identifier, directory);
        let key = resolver::conversation_key(&conversation);
        let mut session = Self {
            conversation: Some(conversation),
            conversation_key: Some(key),
            store,
            transcript: Vec::new(),
            state: SessionState::Loading,
            simulator,
            inbound_rx: rx,
            _inbound_tx: tx.clone(),
        };

        let key = session.conversation_key.clone().unwrap_or_default();
        session.transcript = session.store.load(&key);

        // Simulated inbound is attributed to the conversation key, the
        // same sender id the seed history uses for the peer.
        session.simulator.start(&key, &key, &session.store, tx);
        session.state = SessionState::Active;

        if let Some(conversation) = &session.conversation {
            info!(
                "opened chat with {} (key {}, {} seeded messages)",
                conversation.name,
                key,
                session.transcript.len()
            );
        }
        session
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    pub fn conversation_key(&self) -> Option<&str> {
        self.conversation_key.as_deref()
    }

    /// The live transcript: seeded history followed by everything sent or
    /// delivered since the session opened, in order.
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn simulator_running(&self) -> bool {
        self.simulator.is_running()
    }

    /// Send locally composed text. Blank input (empty or whitespace-only
    /// after trimming) is silently ignored and leaves the transcript
    /// untouched. Returns the appended message otherwise.
    pub fn send(&mut self, text: &str) -> Option<&Message> {
        if self.state != SessionState::Active {
            return None;
        }
        let body = text.trim();
        if body.is_empty() {
            debug!("ignoring blank send");
            return None;
        }
        let message = Message {
            id: next_message_id(),
            sender_id: LOCAL_USER_ID.to_string(),
            recipient_id: self.outbound_recipient()?,
            content: body.to_string(),
            kind: MessageKind::Text,
            timestamp_label: clock_label(),
            is_read: true,
            image_url: None,
        };
        self.append_message(message)
    }

    /// Send a locally attached image. The payload is encoded into a data
    /// URI before the message is appended, so a transcript entry always
    /// carries a complete image reference. An empty payload (no file
    /// picked) is ignored like a blank text send.
    pub fn send_image(&mut self, mime: &str, payload: &[u8]) -> Option<&Message> {
        if self.state != SessionState::Active {
            return None;
        }
        if payload.is_empty() {
            debug!("ignoring image send with no payload");
            return None;
        }
        let data_uri = format!("data:{};base64,{}", mime, BASE64.encode(payload));
        let message = Message {
            id: next_message_id(),
            sender_id: LOCAL_USER_ID.to_string(),
            recipient_id: self.outbound_recipient()?,
            content: IMAGE_CONTENT_LABEL.to_string(),
            kind: MessageKind::Image,
            timestamp_label: clock_label(),
            is_read: true,
            image_url: Some(data_uri),
        };
        self.append_message(message)
    }

    /// Wait for the next simulated inbound message and append it. Returns
    /// the appended message, or `None` once the session is no longer
    /// active.
    pub async fn recv_simulated(&mut self) -> Option<Message> {
        if self.state != SessionState::Active {
            return None;
        }
        let message = self.inbound_rx.recv().await?;
        self.append_inbound(message)
    }

    /// Append at most one already-delivered simulated message, without
    /// waiting.
    pub fn try_recv_simulated(&mut self) -> Option<Message> {
        if self.state != SessionState::Active {
            return None;
        }
        let message = self.inbound_rx.try_recv().ok()?;
        self.append_inbound(message)
    }

    /// Drain every pending simulated message into the transcript. Returns
    /// how many arrived.
    pub fn drain_simulated(&mut self) -> usize {
        let mut appended = 0;
        while self.try_recv_simulated().is_some() {
            appended += 1;
        }
        appended
    }

    /// Stop the delivery simulator and end the session. After this
    /// returns no further appends can happen, including from a tick that
    /// was already in flight. Safe to call more than once.
    pub fn close(&mut self) {
        if matches!(self.state, SessionState::Closed) {
            return;
        }
        self.simulator.stop();
        // Discard anything delivered between the last drain and the stop.
        while self.inbound_rx.try_recv().is_ok() {}
        if let Some(key) = &self.conversation_key {
            info!("closed chat session for {}", key);
        }
        self.state = SessionState::Closed;
    }

    /// Resolve how a message should be attributed on screen. Group
    /// senders are looked up in the membership list and unknown ids get a
    /// placeholder label instead of failing the render.
    pub fn sender_label(&self, message: &Message) -> SenderLabel {
        if message.is_local() {
            return SenderLabel {
                name: "You".to_string(),
                avatar_glyph: "ME".to_string(),
                is_local: true,
            };
        }
        let Some(conversation) = &self.conversation else {
            return unknown_sender();
        };
        if conversation.is_group() {
            match conversation.member(&message.sender_id) {
                Some(member) => SenderLabel {
                    name: member.name.clone(),
                    avatar_glyph: member.avatar_glyph.clone(),
                    is_local: false,
                },
                None => unknown_sender(),
            }
        } else {
            SenderLabel {
                name: conversation.name.clone(),
                avatar_glyph: conversation.avatar_glyph.clone(),
                is_local: false,
            }
        }
    }

    fn outbound_recipient(&self) -> Option<String> {
        let key = self.conversation_key.as_ref()?;
        let conversation = self.conversation.as_ref()?;
        Some(if conversation.is_group() {
            group_recipient(key)
        } else {
            key.clone()
        })
    }

    fn append_message(&mut self, message: Message) -> Option<&Message> {
        let key = self.conversation_key.as_ref()?;
        self.store.append(key, message.clone());
        self.transcript.push(message);
        self.transcript.last()
    }

    fn append_inbound(&mut self, message: Message) -> Option<Message> {
        let key = self.conversation_key.as_ref()?;
        debug!("simulated message from {} arrived", message.sender_id);
        self.store.append(key, message.clone());
        self.transcript.push(message.clone());
        Some(message)
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.close();
    }
}

fn unknown_sender() -> SenderLabel {
    SenderLabel {
        name: UNKNOWN_SENDER_LABEL.to_string(),
        avatar_glyph: "??".to_string(),
        is_local: false,
    }
}

// Message ids come from the wall clock, like the seed data's. Two
// messages can land in the same millisecond, so the floor only ever moves
// forward.
static LAST_MESSAGE_ID_MILLIS: AtomicI64 = AtomicI64::new(0);

pub(crate) fn next_message_id() -> String {
    let now = Local::now().timestamp_millis();
    let assigned = LAST_MESSAGE_ID_MILLIS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(if now > last { now } else { last + 1 })
        })
        .map(|last| if now > last { now } else { last + 1 })
        .unwrap_or(now);
    assigned.to_string()
}

/// Display timestamp for a live message, matching the seed data's
/// 24-hour hour:minute labels.
pub(crate) fn clock_label() -> String {
    Local::now().format("%H:%M").to_string()
}
