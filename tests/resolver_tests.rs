// Conversation resolver tests
// These tests verify identifier resolution, synthesis for unknown
// identifiers, and canonical conversation key derivation

mod common;
use common::{private_conversation, seeded_directory, setup_logging};

use quadchat::chat::resolver::{self, KEY_ALIASES};
use quadchat::chat::ConversationDirectory;
use quadchat::models::ConversationKind;

/// Test that every directory entry resolves to itself, never a synthesized copy
#[test]
fn test_known_identifiers_resolve_to_directory_entries() {
    setup_logging();

    println!("\n=== Testing resolution of known identifiers ===");

    let directory = seeded_directory();
    for entry in directory.list(None) {
        let resolved = resolver::resolve(&entry.id, &directory);
        assert_eq!(
            &resolved, entry,
            "Identifier {} should resolve to the exact directory entry",
            entry.id
        );
    }
    println!("✅ All {} directory ids resolve to their entries", directory.len());

    println!("=== Known identifier resolution test completed ===\n");
}

/// Test synthesis of a transient conversation for unknown identifiers
#[test]
fn test_unknown_identifier_synthesizes_private_conversation() {
    setup_logging();

    println!("\n=== Testing synthesis for unknown identifiers ===");

    let directory = seeded_directory();
    let synthesized = resolver::resolve("unknown-42", &directory);

    assert_eq!(synthesized.name, "unknown-42");
    assert_eq!(synthesized.avatar_glyph, "UN");
    assert_eq!(synthesized.kind, ConversationKind::Private);
    assert!(synthesized.members.is_empty());
    assert!(synthesized.last_message_preview.is_empty());
    assert!(!synthesized.unread);
    assert_eq!(synthesized.unread_count, 0);
    println!("✅ unknown-42 synthesized with avatar UN");

    // Synthesis never writes back to the directory
    assert!(directory.find_by_id("unknown-42").is_none());

    // Glyph edge cases: short identifiers and lowercase input
    assert_eq!(resolver::synthesize("x").avatar_glyph, "X");
    assert_eq!(resolver::synthesize("ab-cd").avatar_glyph, "AB");
    println!("✅ Avatar glyph is the first two characters, uppercased");

    println!("=== Synthesis test completed ===\n");
}

/// Test canonical key derivation for both entry points
#[test]
fn test_conversation_key_derivation() {
    setup_logging();

    println!("\n=== Testing conversation key derivation ===");

    let directory = seeded_directory();

    // The deep-link scenario: id 7 must land on the mike-johnson transcript
    let mike = resolver::resolve("7", &directory);
    assert_eq!(resolver::conversation_key(&mike), "mike-johnson");

    // List selection and deep link must agree on the key
    let via_list = resolver::resolve("7", &directory);
    let via_route = resolver::resolve(" 7 ", &directory);
    assert_eq!(
        resolver::conversation_key(&via_list),
        resolver::conversation_key(&via_route),
        "Both entry points must derive the same key"
    );
    println!("✅ List selection and deep link agree on mike-johnson");

    // Groups use their fixed key
    let group = resolver::resolve("9", &directory);
    assert_eq!(resolver::conversation_key(&group), "study-group");

    // Unknown identifiers fall back to their normalized name
    let adhoc = resolver::resolve("unknown-42", &directory);
    assert_eq!(resolver::conversation_key(&adhoc), "unknown-42");

    println!("=== Key derivation test completed ===\n");
}

/// Test the alias table exhaustively: every entry must map a normalized
/// display name to the key the seed transcripts are stored under
#[test]
fn test_alias_table_is_exhaustive_and_consistent() {
    setup_logging();

    println!("\n=== Testing the name-to-key alias table ===");

    let store = common::seeded_store();
    for (normalized, key) in KEY_ALIASES {
        assert_eq!(
            resolver::normalize_name(&normalized.replace('-', " ")),
            *normalized,
            "Alias table entries must be normalized names"
        );
        assert!(
            store.has_seeded_history(key),
            "Alias target {} has no seeded transcript",
            key
        );
    }
    println!("✅ All {} alias entries point at seeded transcripts", KEY_ALIASES.len());

    // Every seeded private conversation must route through the table
    let directory = seeded_directory();
    for entry in directory.list(Some(ConversationKind::Private)) {
        let key = resolver::conversation_key(entry);
        assert!(
            store.has_seeded_history(&key),
            "Directory entry {} derived key {} with no transcript",
            entry.name,
            key
        );
    }
    println!("✅ Every seeded conversation derives a seeded key");

    println!("=== Alias table test completed ===\n");
}

/// Test display name normalization
#[test]
fn test_name_normalization() {
    setup_logging();

    assert_eq!(resolver::normalize_name("Mike Johnson"), "mike-johnson");
    // Runs of whitespace collapse to a single hyphen
    assert_eq!(resolver::normalize_name("Jean  Luc   Picard"), "jean-luc-picard");
    assert_eq!(resolver::normalize_name("  padded  "), "padded");
    assert_eq!(resolver::normalize_name("single"), "single");

    // A multi-word name without an alias still derives a stable key
    let directory = ConversationDirectory::from_conversations(vec![private_conversation(
        "50",
        "Jean Luc Picard",
    )]);
    let resolved = resolver::resolve("50", &directory);
    assert_eq!(resolver::conversation_key(&resolved), "jean-luc-picard");
    println!("✅ Normalization collapses whitespace and lowercases");
}
