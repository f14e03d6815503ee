//! The reputation ledger: client feedback threads and aggregation.

mod ledger;
mod types;

pub use ledger::ReputationLedger;
pub use types::{
    FeedbackInput, FeedbackPage, FeedbackRecord, FeedbackSummary, ResponseRecord,
    MAX_SCORE_DECIMALS,
};
