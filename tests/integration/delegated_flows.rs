//! Integration test: deadline-bound delegated flows.
//!
//! Exercises the two double-authorization paths end to end on a manual
//! clock: delegated registration (owner signs, agent submits) and wallet
//! rotation (caller capability + target proof of control), plus a policy
//! signer standing in for a contract-like owner.

use std::sync::Arc;

use agent_registry::crypto::Ed25519KeyPair;
use agent_registry::reputation::FeedbackInput;
use agent_registry::signature::{
    authorization_blob, delegated_registration_digest, wallet_proof_digest, SignerPolicy,
};
use agent_registry::{Address, AgentRegistry, ErrorKind, ManualClock, RegistryError};

fn addr(n: u8) -> Address {
    Address([n; 20])
}

fn key_holder() -> (Ed25519KeyPair, Address) {
    let kp = Ed25519KeyPair::generate();
    let address = Address::from_verifying_key(kp.verifying_key());
    (kp, address)
}

#[test]
fn delegated_registration_binds_submitter_uri_and_deadline() {
    let clock = Arc::new(ManualClock::new(1_000_000));
    let mut registry = AgentRegistry::with_clock(clock.clone());

    let (owner_kp, owner) = key_holder();
    let agent_addr = addr(10);
    let deadline = 2_000_000;
    let digest = delegated_registration_digest(&agent_addr, "ipfs://passport", deadline);
    let sig = authorization_blob(&owner_kp, &digest);

    // Wrong submitter, wrong URI: both rejected as signature failures.
    assert_eq!(
        registry
            .register_delegated(addr(11), "ipfs://passport".into(), owner, deadline, &sig)
            .unwrap_err()
            .kind(),
        ErrorKind::Signature
    );
    assert_eq!(
        registry
            .register_delegated(agent_addr, "ipfs://forged".into(), owner, deadline, &sig)
            .unwrap_err()
            .kind(),
        ErrorKind::Signature
    );

    // The authorized submitter, in time: accepted.
    let id = registry
        .register_delegated(agent_addr, "ipfs://passport".into(), owner, deadline, &sig)
        .expect("delegated registration");
    assert_eq!(registry.owner_of(id).unwrap(), owner);
    assert_eq!(registry.agent(id).unwrap().agent_address, Some(agent_addr));
    assert_eq!(registry.agent(id).unwrap().uri.as_deref(), Some("ipfs://passport"));

    // The agent working address holds no capability by itself.
    assert!(!registry.is_authorized(id, agent_addr).unwrap());

    // Replaying the same payload after the deadline fails; the caller
    // must obtain a fresh signature, not retry.
    clock.set(2_000_001);
    assert!(matches!(
        registry
            .register_delegated(agent_addr, "ipfs://passport".into(), owner, deadline, &sig)
            .unwrap_err(),
        RegistryError::DeadlineExpired { .. }
    ));
}

#[test]
fn wallet_rotation_requires_both_authorizations() {
    let clock = Arc::new(ManualClock::new(1_000_000));
    let mut registry = AgentRegistry::with_clock(clock.clone());

    let alice = addr(1);
    let id = registry.register(alice, None, Vec::new()).unwrap();

    let (wallet_kp, wallet) = key_holder();
    let deadline = 5_000_000;
    let digest = wallet_proof_digest(id, &wallet, deadline);
    let proof = authorization_blob(&wallet_kp, &digest);

    // A stranger with a valid proof still lacks caller capability.
    assert_eq!(
        registry
            .set_wallet(addr(9), id, wallet, deadline, &proof)
            .unwrap_err()
            .kind(),
        ErrorKind::Authorization
    );

    // A delegate gains the capability half.
    registry.approve(alice, id, Some(addr(5))).unwrap();
    let old = registry
        .set_wallet(addr(5), id, wallet, deadline, &proof)
        .expect("delegate rotates with wallet consent");
    assert_eq!(old, Some(alice));
    assert_eq!(registry.get_wallet(id).unwrap(), Some(wallet));

    // A proof for agent A cannot rotate agent B's wallet.
    let other = registry.register(alice, None, Vec::new()).unwrap();
    assert_eq!(
        registry
            .set_wallet(alice, other, wallet, deadline, &proof)
            .unwrap_err()
            .kind(),
        ErrorKind::Signature
    );

    // Past the deadline the same proof is dead.
    clock.set(5_000_001);
    assert!(matches!(
        registry
            .set_wallet(alice, id, wallet, deadline, &proof)
            .unwrap_err(),
        RegistryError::DeadlineExpired { .. }
    ));
}

/// A contract-like owner that accepts any digest carrying its seal.
struct SealPolicy {
    seal: Vec<u8>,
}

impl SignerPolicy for SealPolicy {
    fn is_authorized(&self, _digest: &[u8; 32], signature: &[u8]) -> bool {
        signature == self.seal.as_slice()
    }
}

#[test]
fn policy_signer_owner_registers_and_reviews_are_still_guarded() {
    let clock = Arc::new(ManualClock::new(1_000));
    let mut registry = AgentRegistry::with_clock(clock);

    let contract = addr(20);
    registry.verifier_mut().register_policy(
        contract,
        Box::new(SealPolicy {
            seal: b"contract-seal".to_vec(),
        }),
    );

    let id = registry
        .register_delegated(addr(10), "ipfs://doc".into(), contract, 10_000, b"contract-seal")
        .expect("policy signer authorizes registration");
    assert_eq!(registry.owner_of(id).unwrap(), contract);

    // The wrong seal never passes.
    assert_eq!(
        registry
            .register_delegated(addr(11), "ipfs://doc".into(), contract, 10_000, b"forged")
            .unwrap_err()
            .kind(),
        ErrorKind::Signature
    );

    // The self-review guard applies to contract owners like anyone else.
    assert!(matches!(
        registry
            .give_feedback(contract, id, FeedbackInput::score(100))
            .unwrap_err(),
        RegistryError::SelfReview(_)
    ));
    registry
        .give_feedback(addr(30), id, FeedbackInput::score(75))
        .expect("a real client reviews");
}
