//! Stress test: reputation reads at volume.
//!
//! Loads one agent with feedback from many clients, revokes a slice of
//! it, and checks that summaries, pages, and counters agree with a
//! naive recomputation.

use agent_registry::reputation::FeedbackInput;
use agent_registry::{Address, AgentRegistry};

const CLIENTS: u64 = 150;
const ENTRIES_PER_CLIENT: u64 = 4;

fn client(n: u64) -> Address {
    let mut bytes = [0u8; 20];
    bytes[..8].copy_from_slice(&n.to_be_bytes());
    bytes[19] = 1; // never the zero address
    Address(bytes)
}

fn value_for(c: u64, i: u64) -> i64 {
    // Deterministic spread, negatives included.
    ((c * 7 + i * 13) % 201) as i64 - 100
}

fn tag_for(c: u64) -> &'static str {
    if c % 3 == 0 {
        "quality"
    } else {
        "latency"
    }
}

#[test]
fn aggregation_agrees_with_naive_recomputation_at_volume() {
    let mut registry = AgentRegistry::new();
    let owner = Address([0xEE; 20]);
    let agent = registry.register(owner, None, Vec::new()).unwrap();

    for c in 0..CLIENTS {
        for i in 0..ENTRIES_PER_CLIENT {
            let index = registry
                .give_feedback(
                    client(c),
                    agent,
                    FeedbackInput::score(value_for(c, i)).with_tags(tag_for(c), ""),
                )
                .unwrap();
            assert_eq!(index, i + 1, "indices stay dense per client");
        }
    }

    // Revoke every fourth client's second entry.
    for c in (0..CLIENTS).step_by(4) {
        registry.revoke_feedback(client(c), agent, 2).unwrap();
    }

    // Client set: every client exactly once, in first-feedback order.
    let clients = registry.get_clients(agent);
    assert_eq!(clients.len(), CLIENTS as usize);
    assert_eq!(clients[0], client(0));
    assert_eq!(clients[CLIENTS as usize - 1], client(CLIENTS - 1));

    // Naive recomputation over the named half of the population.
    let named: Vec<Address> = (0..CLIENTS / 2).map(client).collect();
    let mut count = 0u64;
    let mut sum = 0i64;
    for c in 0..CLIENTS / 2 {
        for i in 0..ENTRIES_PER_CLIENT {
            let revoked = c % 4 == 0 && i == 1;
            if !revoked && tag_for(c) == "quality" {
                count += 1;
                sum += value_for(c, i);
            }
        }
    }
    let summary = registry
        .get_summary(agent, &named, Some("quality"), None)
        .unwrap();
    assert_eq!(summary.count, count);
    assert_eq!(summary.average, sum / count as i64);

    // The page over everything is exactly sized, revoked rows included
    // or excluded on demand.
    let with_revoked = registry.read_all_feedback(agent, &[], None, None, true);
    assert_eq!(with_revoked.len(), (CLIENTS * ENTRIES_PER_CLIENT) as usize);
    let without = registry.read_all_feedback(agent, &[], None, None, false);
    let revoked_count = CLIENTS.div_ceil(4);
    assert_eq!(
        without.len(),
        (CLIENTS * ENTRIES_PER_CLIENT - revoked_count) as usize
    );
    // Parallel columns stay parallel.
    assert_eq!(without.len(), without.values.len());
    assert_eq!(without.len(), without.indices.len());
    assert_eq!(without.len(), without.tag1s.len());
    assert!(without.revoked.iter().all(|r| !r));
}

#[test]
fn response_threads_scale_per_entry() {
    let mut registry = AgentRegistry::new();
    let owner = Address([0xEE; 20]);
    let agent = registry.register(owner, None, Vec::new()).unwrap();

    registry
        .give_feedback(client(1), agent, FeedbackInput::score(50))
        .unwrap();

    // 40 distinct responders, each responding twice.
    for r in 100..140 {
        for _ in 0..2 {
            registry
                .append_response(client(r), agent, client(1), 1, String::new(), [0u8; 32])
                .unwrap();
        }
    }

    assert_eq!(registry.get_response_count(agent, client(1), 1, &[]), 80);

    // A filter of 10 known responders and 10 strangers counts only the
    // known ones, once each.
    let filter: Vec<Address> = (90..110).map(client).collect();
    assert_eq!(
        registry.get_response_count(agent, client(1), 1, &filter),
        10
    );
}
