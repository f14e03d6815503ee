//! Integration test: full end-to-end lifecycle.
//!
//! Walks the complete path across all three ledgers:
//! 1. Register agents
//! 2. Bind a name
//! 3. Collect client feedback and responses
//! 4. Transfer ownership (wallet cleared, self-review guard flips)
//! 5. Release the name, destroy the agent
//! 6. Replay the event log

use agent_registry::reputation::FeedbackInput;
use agent_registry::{Address, AgentId, AgentRegistry, Event, MetadataEntry, RegistryError};

fn addr(n: u8) -> Address {
    Address([n; 20])
}

#[test]
fn full_lifecycle_register_to_destroy() {
    let mut registry = AgentRegistry::new();
    let alice = addr(1);
    let bob = addr(2);
    let carol = addr(3);

    // ── Step 1: Register agents ─────────────────────────────────────────
    let vpn = registry
        .register(
            alice,
            Some("ipfs://vpn-passport".into()),
            vec![MetadataEntry {
                key: "class".into(),
                value: b"network".to_vec(),
            }],
        )
        .expect("Alice registers her agent");
    let proxy = registry
        .register(alice, Some("ipfs://proxy-passport".into()), Vec::new())
        .expect("Alice registers a second agent");

    assert_eq!(vpn, AgentId(1));
    assert_eq!(proxy, AgentId(2));
    assert_eq!(registry.owners_agents(&alice), &[vpn, proxy]);
    assert_eq!(
        registry.get_wallet(vpn).unwrap(),
        Some(alice),
        "wallet defaults to the creator"
    );

    // ── Step 2: Bind a name ─────────────────────────────────────────────
    registry
        .register_name(alice, b"vpn", vpn)
        .expect("owner binds the name");
    assert_eq!(registry.resolve_name(b"vpn"), vpn);
    assert_eq!(registry.reverse_resolve(vpn), Some(&b"vpn"[..]));
    assert_eq!(registry.resolve_owner(b"vpn").unwrap(), alice);

    // ── Step 3: Clients review the agent ────────────────────────────────
    let idx_bob = registry
        .give_feedback(
            bob,
            vpn,
            FeedbackInput::score(80).with_tags("quality", "eu"),
        )
        .expect("Bob reviews");
    let idx_carol = registry
        .give_feedback(
            carol,
            vpn,
            FeedbackInput::score(90).with_tags("quality", "us"),
        )
        .expect("Carol reviews");
    assert_eq!((idx_bob, idx_carol), (1, 1));

    // The owner herself is barred.
    assert!(matches!(
        registry
            .give_feedback(alice, vpn, FeedbackInput::score(100))
            .unwrap_err(),
        RegistryError::SelfReview(_)
    ));

    let summary = registry
        .get_summary(vpn, &[bob, carol], None, None)
        .unwrap();
    assert_eq!((summary.count, summary.average), (2, 85));

    registry
        .append_response(alice, vpn, bob, 1, "ipfs://reply".into(), [9u8; 32])
        .expect("the operator answers Bob in public");
    assert_eq!(registry.get_response_count(vpn, bob, 1, &[]), 1);

    // ── Step 4: Transfer ownership ──────────────────────────────────────
    registry
        .transfer(alice, vpn, bob)
        .expect("Alice sells the agent to Bob");

    assert_eq!(registry.owner_of(vpn).unwrap(), bob);
    assert_eq!(
        registry.get_wallet(vpn).unwrap(),
        None,
        "payment destination never survives a change of control"
    );
    assert_eq!(registry.owners_agents(&alice), &[proxy]);
    assert_eq!(registry.owners_agents(&bob), &[vpn]);

    // The guard follows current ownership: Bob is now barred, Alice free.
    assert!(registry
        .give_feedback(bob, vpn, FeedbackInput::score(100))
        .is_err());
    registry
        .give_feedback(alice, vpn, FeedbackInput::score(60))
        .expect("the previous owner now reviews like any client");

    // Bob's old feedback thread still reads back.
    assert_eq!(registry.read_feedback(vpn, bob, 1).unwrap().value, 80);

    // ── Step 5: Release the name, destroy the agent ─────────────────────
    registry
        .release_name(bob, b"vpn")
        .expect("current owner releases the name");
    registry.destroy(bob, vpn).expect("current owner destroys");

    assert!(matches!(
        registry.owner_of(vpn).unwrap_err(),
        RegistryError::AgentNotFound(_)
    ));
    assert!(registry.owners_agents(&bob).is_empty());
    assert_eq!(registry.resolve_name(b"vpn"), AgentId::NONE);
    assert!(registry.is_name_available(b"vpn"));

    // Reputation history outlives the agent.
    assert_eq!(registry.read_feedback(vpn, bob, 1).unwrap().value, 80);
    assert_eq!(registry.get_clients(vpn).len(), 3);

    // Destroyed ids are never reused.
    let next = registry.register(carol, None, Vec::new()).unwrap();
    assert_eq!(next, AgentId(3));

    // ── Step 6: Replay the event log ────────────────────────────────────
    let records = registry.events().records();
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.seq, i as u64, "sequence numbers are dense");
    }
    let destroyed: Vec<&Event> = records
        .iter()
        .map(|r| &r.event)
        .filter(|e| matches!(e, Event::AgentDestroyed { .. }))
        .collect();
    assert_eq!(destroyed.len(), 1);
    assert!(matches!(
        destroyed[0],
        Event::AgentDestroyed { id, owner } if *id == vpn && *owner == bob
    ));

    let json = registry.events().export_json().unwrap();
    assert!(json.contains("AgentDestroyed"));
}
