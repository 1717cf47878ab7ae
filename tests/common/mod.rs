// Common test utilities for integration tests
// This module contains shared code for all integration tests

// Standard library imports
use std::sync::Once;
use std::time::Duration;

// External crate imports
use log::LevelFilter;

// Import the crate functionality
use quadchat::chat::{ConversationDirectory, MessageStore, SimulatorConfig};
use quadchat::models::{Conversation, ConversationKind, Member};

// Initialize logging once
static INIT_LOGGER: Once = Once::new();

/// Set up the logger for the tests
pub fn setup_logging() {
    INIT_LOGGER.call_once(|| {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .init();
    });
}

/// Directory built from the embedded seed data
pub fn seeded_directory() -> ConversationDirectory {
    ConversationDirectory::from_seed().expect("seed directory should parse")
}

/// Message store built from the embedded seed data
pub fn seeded_store() -> MessageStore {
    MessageStore::from_seed().expect("seed transcripts should parse")
}

/// Simulator timing for delivery tests: a tick every few milliseconds
/// that always delivers
pub fn eager_simulator() -> SimulatorConfig {
    SimulatorConfig {
        interval: Duration::from_millis(5),
        probability: 1.0,
    }
}

/// Simulator that ticks but never delivers, for tests that need a quiet
/// transcript
pub fn quiet_simulator() -> SimulatorConfig {
    SimulatorConfig::disabled()
}

/// A bare private conversation for directory fixtures
pub fn private_conversation(id: &str, name: &str) -> Conversation {
    Conversation {
        id: id.to_string(),
        name: name.to_string(),
        avatar_glyph: name.chars().take(2).collect::<String>().to_uppercase(),
        kind: ConversationKind::Private,
        last_message_preview: String::new(),
        timestamp_label: String::new(),
        unread: false,
        unread_count: 0,
        members: Vec::new(),
    }
}

/// A group conversation with an explicit member list
pub fn group_conversation(id: &str, name: &str, members: Vec<Member>) -> Conversation {
    Conversation {
        id: id.to_string(),
        name: name.to_string(),
        avatar_glyph: "GR".to_string(),
        kind: ConversationKind::Group,
        last_message_preview: String::new(),
        timestamp_label: String::new(),
        unread: false,
        unread_count: 0,
        members,
    }
}

pub fn member(id: &str, name: &str, avatar_glyph: &str) -> Member {
    Member {
        id: id.to_string(),
        name: name.to_string(),
        avatar_glyph: avatar_glyph.to_string(),
    }
}
