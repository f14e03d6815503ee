//! Deadline-bound signature verification and domain separation.
//!
//! [`SignatureVerifier`] answers one question: did the claimed address
//! authorize this exact digest, and is the authorization still live? It
//! is polymorphic over signer kind:
//!
//! - **Direct key holder** — the signature blob is the signer's Ed25519
//!   public key followed by a signature over the digest; the key must
//!   hash to the claimed address.
//! - **Policy signer** — an address with a registered [`SignerPolicy`]
//!   validates on its own behalf (the contract-wallet analogue).
//!
//! The digest builders at the bottom are the shared domain-separation
//! utility: every signable message is prefixed with a crate-level domain
//! tag and an operation tag, so an authorization produced for one
//! operation can never be replayed against another.

use std::collections::HashMap;
use std::fmt;

use ed25519_dalek::Signature;
use sha2::{Digest, Sha256};

use crate::crypto::keys::Ed25519KeyPair;
use crate::crypto::signing;
use crate::error::{RegistryError, Result};
use crate::identity::{Address, AgentId};

/// Domain tag mixed into every signable digest.
const SIGNING_DOMAIN: &str = "agent-registry/v1";

/// Direct-signer blob layout: 32-byte public key ‖ 64-byte signature.
const DIRECT_BLOB_LEN: usize = 32 + 64;

/// Validation logic owned by a contract-like signer.
///
/// Registered per address; the verifier defers to it instead of the
/// direct Ed25519 path. Implementations decide entirely for themselves
/// what a valid `signature` blob looks like.
pub trait SignerPolicy: Send + Sync {
    /// Return `true` when `signature` proves this signer authorized `digest`.
    fn is_authorized(&self, digest: &[u8; 32], signature: &[u8]) -> bool;
}

/// Verifies deadline-bound authorizations for both signer kinds.
#[derive(Default)]
pub struct SignatureVerifier {
    policies: HashMap<Address, Box<dyn SignerPolicy>>,
}

impl SignatureVerifier {
    /// Create a verifier with no registered policies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `policy` as the validation logic for `address`.
    ///
    /// From then on every authorization claimed by `address` is decided
    /// by the policy; the direct Ed25519 path no longer applies to it.
    pub fn register_policy(&mut self, address: Address, policy: Box<dyn SignerPolicy>) {
        self.policies.insert(address, policy);
    }

    /// Return `true` when `address` has a registered policy.
    pub fn has_policy(&self, address: &Address) -> bool {
        self.policies.contains_key(address)
    }

    /// Check that `claimed` authorized `digest` no later than `deadline`.
    ///
    /// `now` is the ledger's execution-time clock, never the signing
    /// time: a signature produced in time but submitted late is rejected
    /// and must be re-signed.
    ///
    /// # Errors
    ///
    /// `DeadlineExpired` when `now > deadline`; `SignatureInvalid` when
    /// the blob is malformed, the embedded key does not hash to
    /// `claimed`, the signature does not verify, or a registered policy
    /// rejects.
    pub fn verify(
        &self,
        claimed: Address,
        digest: &[u8; 32],
        signature: &[u8],
        deadline: u64,
        now: u64,
    ) -> Result<()> {
        if now > deadline {
            return Err(RegistryError::DeadlineExpired { deadline, now });
        }

        if let Some(policy) = self.policies.get(&claimed) {
            return if policy.is_authorized(digest, signature) {
                Ok(())
            } else {
                Err(RegistryError::SignatureInvalid)
            };
        }

        if signature.len() != DIRECT_BLOB_LEN {
            return Err(RegistryError::SignatureInvalid);
        }
        let key_bytes: [u8; 32] = signature[..32]
            .try_into()
            .map_err(|_| RegistryError::SignatureInvalid)?;
        let verifying_key = Ed25519KeyPair::verifying_key_from_bytes(&key_bytes)?;
        if Address::from_verifying_key(&verifying_key) != claimed {
            return Err(RegistryError::SignatureInvalid);
        }
        let sig_bytes: [u8; 64] = signature[32..]
            .try_into()
            .map_err(|_| RegistryError::SignatureInvalid)?;
        let sig = Signature::from_bytes(&sig_bytes);
        signing::verify(&verifying_key, digest, &sig)
    }
}

impl fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("policies", &self.policies.len())
            .finish()
    }
}

/// Package a direct-signer authorization blob over `digest`.
pub fn authorization_blob(key_pair: &Ed25519KeyPair, digest: &[u8; 32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(DIRECT_BLOB_LEN);
    blob.extend_from_slice(&key_pair.verifying_key_bytes());
    blob.extend_from_slice(&signing::sign(key_pair.signing_key(), digest).to_bytes());
    blob
}

// ── Domain-separated digests ─────────────────────────────────────────────────

/// Digest an owner signs to authorize a delegated registration.
///
/// Binds the submitting agent address, the agent URI, and the deadline.
/// The variable-length URI goes last so the fixed-width fields parse
/// unambiguously.
pub fn delegated_registration_digest(
    agent_address: &Address,
    uri: &str,
    deadline: u64,
) -> [u8; 32] {
    let input = format!(
        "{SIGNING_DOMAIN}:register-delegated:{}:{deadline}:{uri}",
        hex::encode(agent_address.as_bytes()),
    );
    Sha256::digest(input.as_bytes()).into()
}

/// Digest a wallet signs to prove it consents to becoming the payment
/// destination of `agent`.
pub fn wallet_proof_digest(agent: AgentId, new_wallet: &Address, deadline: u64) -> [u8; 32] {
    let input = format!(
        "{SIGNING_DOMAIN}:set-wallet:{}:{}:{deadline}",
        agent.0,
        hex::encode(new_wallet.as_bytes()),
    );
    Sha256::digest(input.as_bytes()).into()
}
