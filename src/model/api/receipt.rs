use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{common::Scope, db::ballot::BallotCore};

/// What a voter gets back after casting: enough to look the ballot up later,
/// never the selections themselves.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub scope: Scope,
    pub reference_no: String,
    pub cast_at: DateTime<Utc>,
}

impl From<&BallotCore> for VoteReceipt {
    fn from(ballot: &BallotCore) -> Self {
        Self {
            scope: ballot.scope,
            reference_no: ballot.reference_no.clone(),
            cast_at: ballot.cast_at,
        }
    }
}
