//! Stress test: owner enumeration under randomized churn.
//!
//! Drives a long random sequence of register/transfer/destroy calls and
//! checks after every step that `owners_agents` matches a naive model —
//! the same live ids per owner, no duplicates, no stale entries —
//! regardless of how swap-and-pop reorders the lists.

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use agent_registry::{Address, AgentId, AgentRegistry};

const OWNERS: u8 = 6;
const STEPS: usize = 2_000;

fn addr(n: u8) -> Address {
    Address([n; 20])
}

/// Naive reference model: owner → set of live ids.
#[derive(Default)]
struct Model {
    by_owner: HashMap<Address, HashSet<AgentId>>,
    live: Vec<(AgentId, Address)>,
}

impl Model {
    fn register(&mut self, owner: Address, id: AgentId) {
        self.by_owner.entry(owner).or_default().insert(id);
        self.live.push((id, owner));
    }

    fn transfer(&mut self, pos: usize, to: Address) {
        let (id, from) = self.live[pos];
        if from != to {
            if let Some(set) = self.by_owner.get_mut(&from) {
                set.remove(&id);
            }
            self.by_owner.entry(to).or_default().insert(id);
            self.live[pos] = (id, to);
        }
    }

    fn destroy(&mut self, pos: usize) {
        let (id, owner) = self.live.swap_remove(pos);
        if let Some(set) = self.by_owner.get_mut(&owner) {
            set.remove(&id);
        }
    }
}

fn check(registry: &AgentRegistry, model: &Model, step: usize) {
    for n in 1..=OWNERS {
        let owner = addr(n);
        let listed = registry.owners_agents(&owner);
        let listed_set: HashSet<AgentId> = listed.iter().copied().collect();
        assert_eq!(
            listed_set.len(),
            listed.len(),
            "step {step}: duplicate ids in owner {owner} list"
        );
        let expected = model.by_owner.get(&owner).cloned().unwrap_or_default();
        assert_eq!(
            listed_set, expected,
            "step {step}: owner {owner} enumeration diverged"
        );
    }
}

#[test]
fn enumeration_stays_consistent_under_churn() {
    let mut rng = StdRng::seed_from_u64(0x8004);
    let mut registry = AgentRegistry::new();
    let mut model = Model::default();

    for step in 0..STEPS {
        let roll: u8 = rng.gen_range(0..10);
        match roll {
            // Register: weighted up so the population grows.
            0..=4 => {
                let owner = addr(rng.gen_range(1..=OWNERS));
                let id = registry
                    .register(owner, None, Vec::new())
                    .expect("register never fails for a live owner");
                model.register(owner, id);
            }
            // Transfer a random live agent, self-transfers included.
            5..=7 if !model.live.is_empty() => {
                let pos = rng.gen_range(0..model.live.len());
                let (id, from) = model.live[pos];
                let to = addr(rng.gen_range(1..=OWNERS));
                registry.transfer(from, id, to).expect("owner transfer");
                model.transfer(pos, to);
            }
            // Destroy a random live agent.
            _ if !model.live.is_empty() => {
                let pos = rng.gen_range(0..model.live.len());
                let (id, owner) = model.live[pos];
                registry.destroy(owner, id).expect("owner destroy");
                model.destroy(pos);
            }
            _ => {}
        }
        check(&registry, &model, step);
    }

    // The churn must have actually exercised every path.
    assert!(
        model.live.len() > 100,
        "churn ended with an implausibly small population"
    );

    // Destroyed ids stayed destroyed: every live id resolves, the id
    // space beyond them is dense.
    for (id, owner) in &model.live {
        assert_eq!(registry.owner_of(*id).unwrap(), *owner);
    }
}

#[test]
fn repeated_swap_removal_from_one_owner() {
    // Degenerate churn: one owner, removals always from the front of an
    // unknown order. Exercises the moved-record position bookkeeping.
    let mut registry = AgentRegistry::new();
    let owner = addr(1);
    let mut ids: HashSet<AgentId> = (0..200)
        .map(|_| registry.register(owner, None, Vec::new()).unwrap())
        .collect();

    while !ids.is_empty() {
        let head = registry.owners_agents(&owner)[0];
        assert!(ids.remove(&head), "listed id must be live and owned");
        registry.destroy(owner, head).unwrap();

        let listed: HashSet<AgentId> = registry.owners_agents(&owner).iter().copied().collect();
        assert_eq!(listed, ids);
    }
    assert!(registry.owners_agents(&owner).is_empty());
}
