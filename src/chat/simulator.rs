// Delivery simulator: fakes the other side of a conversation.
//
// There is no real transport behind this client, so an open session with a
// known contact gets occasional inbound traffic from a periodic task. Each
// tick rolls a die and, under the threshold, delivers one canned phrase as
// the peer. Purely illustrative: no delivery guarantees, no retries.

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::store::MessageStore;
use crate::models::{Message, MessageKind, LOCAL_USER_ID};

/// Phrase pool simulated peers answer from.
pub const SIMULATED_PHRASES: &[&str] = &[
    "That's interesting!",
    "I see what you mean.",
    "Thanks for sharing!",
    "Got it!",
    "Sounds good!",
    "I'll check it out.",
    "Let me know if you need anything else.",
    "Perfect!",
    "That works for me.",
    "I'll get back to you soon.",
];

#[derive(Debug, Clone, Copy)]
pub struct SimulatorConfig {
    /// How often the simulator considers delivering a message.
    pub interval: Duration,
    /// Per-tick delivery probability, in [0, 1].
    pub probability: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            probability: 0.1,
        }
    }
}

impl SimulatorConfig {
    /// A simulator that ticks but never delivers.
    pub fn disabled() -> Self {
        Self {
            probability: 0.0,
            ..Self::default()
        }
    }
}

/// Cancellable background task producing simulated inbound messages for
/// one open session.
///
/// Cancellation is a generation counter, not just timer teardown: `stop`
/// bumps the generation and a tick that raced past the abort sees the
/// stale value and delivers nothing. A session that has been closed can
/// therefore never gain another transcript entry from a late tick.
pub struct DeliverySimulator {
    config: SimulatorConfig,
    generation: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl DeliverySimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            config,
            generation: Arc::new(AtomicU64::new(0)),
            handle: None,
        }
    }

    /// Begin simulated delivery for a conversation key, sending inbound
    /// messages through `tx`. Conversations without seeded history are
    /// ad-hoc contacts nobody is behind, so the simulator stays idle for
    /// them.
    pub fn start(
        &mut self,
        conversation_key: &str,
        peer_id: &str,
        store: &MessageStore,
        tx: mpsc::Sender<Message>,
    ) {
        self.stop();

        if !store.has_seeded_history(conversation_key) {
            debug!(
                "no seeded history under {}, delivery simulation stays idle",
                conversation_key
            );
            return;
        }

        let my_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let config = self.config;
        let peer = peer_id.to_string();
        let key = conversation_key.to_string();

        info!(
            "starting delivery simulation for {} every {:?}",
            key, config.interval
        );
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.interval);
            // The first tick of a tokio interval completes immediately;
            // consume it so delivery starts one full interval in.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if generation.load(Ordering::SeqCst) != my_generation {
                    break;
                }
                // rng is scoped so it never lives across an await
                let delivery = {
                    let mut rng = rand::thread_rng();
                    if rng.gen::<f64>() < config.probability {
                        SIMULATED_PHRASES.choose(&mut rng).copied()
                    } else {
                        None
                    }
                };
                let Some(phrase) = delivery else { continue };
                let message = synthetic_inbound(&peer, phrase);
                // Re-check after building the message: stop() may have won
                // the race between the tick and the send.
                if generation.load(Ordering::SeqCst) != my_generation {
                    break;
                }
                if tx.send(message).await.is_err() {
                    debug!("session for {} went away, stopping simulation", key);
                    break;
                }
            }
        }));
    }

    /// Cancel the periodic task. In-flight ticks become inert immediately.
    pub fn stop(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("delivery simulation stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for DeliverySimulator {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Build one simulated inbound message from the peer to the local user.
fn synthetic_inbound(peer_id: &str, phrase: &str) -> Message {
    Message {
        id: super::next_message_id(),
        sender_id: peer_id.to_string(),
        recipient_id: LOCAL_USER_ID.to_string(),
        content: phrase.to_string(),
        kind: MessageKind::Text,
        timestamp_label: super::clock_label(),
        is_read: false,
        image_url: None,
    }
}
