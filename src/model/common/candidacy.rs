use mongodb::bson::{to_bson, Bson};
use serde::{Deserialize, Serialize};

/// States in the candidate-application lifecycle.
/// `Approved` and `Rejected` are terminal; there is no resubmission path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidacyStatus {
    /// Filed, awaiting an admin decision.
    Pending,
    /// Cleared to appear on the ballot.
    Approved,
    /// Turned down; `remarks` explains why.
    Rejected,
}

impl From<CandidacyStatus> for Bson {
    fn from(status: CandidacyStatus) -> Self {
        to_bson(&status).expect("Serialisation is infallible")
    }
}
