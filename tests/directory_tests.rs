// Conversation directory tests
// These tests verify the seeded registry: ordering, filtering, and lookup

mod common;
use common::{seeded_directory, setup_logging};

use quadchat::models::ConversationKind;

/// Test that the seed data produces the expected directory
#[test]
fn test_seed_directory_contents() {
    setup_logging();

    println!("\n=== Testing seeded directory contents ===");

    let directory = seeded_directory();
    assert_eq!(directory.len(), 9, "Expected 9 seeded conversations");
    assert!(!directory.is_empty());

    let all = directory.list(None);
    assert_eq!(all[0].name, "Sarah Chen", "Seed order should be preserved");
    println!("✅ Directory has {} conversations, first is {}", all.len(), all[0].name);

    // The deep-link scenario everything else builds on: id 7 is Mike Johnson
    let mike = directory.find_by_id("7").expect("Mike Johnson should be seeded");
    assert_eq!(mike.name, "Mike Johnson");
    assert_eq!(mike.kind, ConversationKind::Private);
    assert!(mike.members.is_empty(), "Private chats carry no members");

    let group = directory.find_by_id("9").expect("Study Group should be seeded");
    assert_eq!(group.name, "Study Group");
    assert!(group.is_group());
    assert_eq!(group.members.len(), 3, "Study Group should have 3 members");
    assert_eq!(group.member("u2").map(|m| m.name.as_str()), Some("Mike Johnson"));
    println!("✅ Study Group membership looks right");

    println!("=== Seeded directory contents test completed ===\n");
}

/// Test filtering by conversation kind
#[test]
fn test_list_filtering_preserves_order() {
    setup_logging();

    println!("\n=== Testing directory filtering ===");

    let directory = seeded_directory();

    let private = directory.list(Some(ConversationKind::Private));
    assert_eq!(private.len(), 8);
    assert!(private.iter().all(|c| !c.is_group()));

    let groups = directory.list(Some(ConversationKind::Group));
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "Study Group");

    // Filtering must not reorder: the private list is the full list minus groups
    let all_names: Vec<_> = directory
        .list(None)
        .iter()
        .filter(|c| !c.is_group())
        .map(|c| c.name.clone())
        .collect();
    let private_names: Vec<_> = private.iter().map(|c| c.name.clone()).collect();
    assert_eq!(all_names, private_names, "Filtering changed the ordering");
    println!("✅ Filtering preserves directory insertion order");

    println!("=== Directory filtering test completed ===\n");
}

/// Test identifier lookup with the coercion route parameters go through
#[test]
fn test_find_by_id_is_forgiving() {
    setup_logging();

    let directory = seeded_directory();

    // Route parameters can pick up whitespace on the way in
    assert!(directory.find_by_id(" 7 ").is_some(), "Lookup should trim");
    assert!(directory.find_by_id("7").is_some());
    assert!(directory.find_by_id("77").is_none());
    assert!(directory.find_by_id("").is_none());
    println!("✅ find_by_id trims and rejects unknown ids");
}
