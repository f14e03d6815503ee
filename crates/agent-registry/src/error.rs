//! Error types for AgentRegistry.
//!
//! Every failing condition gets its own variant; [`RegistryError::kind`]
//! collapses them onto the coarse taxonomy callers branch on. Errors are
//! strongly typed and propagated without panicking; a failed call never
//! leaves partial state behind.

use crate::identity::{Address, AgentId};

/// Registry error types covering all operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    // ── authorization ────────────────────────────────────────────────────

    #[error("caller {caller} is not authorized for agent {agent}")]
    NotAuthorized { caller: Address, agent: AgentId },

    #[error("caller {caller} is not the owner of agent {agent}")]
    NotOwner { caller: Address, agent: AgentId },

    #[error("owner or operator of agent {0} cannot review it")]
    SelfReview(AgentId),

    // ── not found ────────────────────────────────────────────────────────

    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("name is not registered")]
    NameNotFound,

    #[error("feedback index {index} out of range for client {client} on agent {agent}")]
    FeedbackNotFound {
        agent: AgentId,
        client: Address,
        index: u64,
    },

    // ── conflict ─────────────────────────────────────────────────────────

    #[error("name is already registered")]
    NameTaken,

    #[error("agent {0} already holds a name")]
    AgentAlreadyNamed(AgentId),

    #[error("metadata key {0:?} is reserved")]
    ReservedMetadataKey(String),

    #[error("feedback index {index} from client {client} on agent {agent} is already revoked")]
    AlreadyRevoked {
        agent: AgentId,
        client: Address,
        index: u64,
    },

    // ── validation ───────────────────────────────────────────────────────

    #[error("name must be 1..=64 bytes, got {0}")]
    InvalidName(usize),

    #[error("decimals must be at most 18, got {0}")]
    DecimalsOutOfRange(u8),

    #[error("client filter must name at least one client")]
    EmptyClientFilter,

    #[error("the zero address is not a valid {0}")]
    ZeroAddress(&'static str),

    // ── signature ────────────────────────────────────────────────────────

    #[error("signature does not prove control of the claimed signer")]
    SignatureInvalid,

    #[error("authorization deadline {deadline} has passed (now {now})")]
    DeadlineExpired { deadline: u64, now: u64 },

    // ── storage (snapshot persistence only) ──────────────────────────────

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Coarse error classification. One kind per row of the error table;
/// external callers retry and report on kinds, not variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Authorization,
    NotFound,
    Conflict,
    Validation,
    Signature,
    Storage,
}

impl RegistryError {
    /// Return the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAuthorized { .. } | Self::NotOwner { .. } | Self::SelfReview(_) => {
                ErrorKind::Authorization
            }
            Self::AgentNotFound(_) | Self::NameNotFound | Self::FeedbackNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::NameTaken
            | Self::AgentAlreadyNamed(_)
            | Self::ReservedMetadataKey(_)
            | Self::AlreadyRevoked { .. } => ErrorKind::Conflict,
            Self::InvalidName(_)
            | Self::DecimalsOutOfRange(_)
            | Self::EmptyClientFilter
            | Self::ZeroAddress(_) => ErrorKind::Validation,
            Self::SignatureInvalid | Self::DeadlineExpired { .. } => ErrorKind::Signature,
            Self::Io(_) | Self::Serialization(_) => ErrorKind::Storage,
        }
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, RegistryError>;
