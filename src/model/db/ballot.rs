use std::collections::HashMap;
use std::ops::Deref;

use chrono::{DateTime, Utc};
use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::model::{
    common::{Position, Scope},
    db::voter::Voter,
    mongodb::Id,
};

type HmacSha256 = Hmac<Sha256>;

/// Bytes of the HMAC digest kept for the reference number (16 base32 chars).
const REFERENCE_NO_BYTES: usize = 10;

/// A cast ballot, as stored in the database. Immutable once written; the
/// unique (voter_id, scope) index rejects a second ballot for the same race.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct BallotCore {
    pub voter_id: Id,
    pub student_id: String,
    /// Voter's home department (canonical spelling), denormalised for the
    /// statistics breakdown.
    pub department: String,
    pub scope: Scope,
    /// One choice per contested position: candidate display name.
    pub selections: HashMap<Position, String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub cast_at: DateTime<Utc>,
    /// Receipt code handed back to the voter for later lookup.
    pub reference_no: String,
}

impl BallotCore {
    /// Assemble a ballot for the given voter, stamping it with a receipt
    /// reference derived from the ballot identity under the server HMAC key.
    pub fn new(
        voter: &Voter,
        scope: Scope,
        selections: HashMap<Position, String>,
        cast_at: DateTime<Utc>,
        hmac_key: &[u8],
    ) -> Self {
        let reference_no = reference_no(&voter.id, scope, cast_at, hmac_key);
        Self {
            voter_id: voter.id,
            student_id: voter.student_id.clone(),
            department: voter.department.clone(),
            scope,
            selections,
            cast_at,
            reference_no,
        }
    }
}

/// A ballot without an ID.
pub type NewBallot = BallotCore;

/// A ballot from the database, with its unique ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct Ballot {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub ballot: BallotCore,
}

impl Deref for Ballot {
    type Target = BallotCore;

    fn deref(&self) -> &Self::Target {
        &self.ballot
    }
}

/// Receipt reference: a truncated HMAC of (voter, scope, cast time), encoded
/// as base32. Keyed so references cannot be forged or enumerated.
fn reference_no(voter_id: &Id, scope: Scope, cast_at: DateTime<Utc>, key: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(&voter_id.bytes());
    mac.update(scope.name().as_bytes());
    mac.update(&cast_at.timestamp_millis().to_le_bytes());
    let digest = mac.finalize().into_bytes();
    BASE32_NOPAD.encode(&digest[..REFERENCE_NO_BYTES])
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test-hmac-key";

    #[test]
    fn reference_no_is_deterministic() {
        let id = Id::new();
        let now = Utc::now();
        let a = reference_no(&id, Scope::Ssg, now, KEY);
        let b = reference_no(&id, Scope::Ssg, now, KEY);
        assert_eq!(a, b);
    }

    #[test]
    fn reference_no_varies_by_scope_and_voter() {
        let id = Id::new();
        let now = Utc::now();
        let ssg = reference_no(&id, Scope::Ssg, now, KEY);
        let dept = reference_no(&id, Scope::Bsit, now, KEY);
        assert_ne!(ssg, dept);
        let other = reference_no(&Id::new(), Scope::Ssg, now, KEY);
        assert_ne!(ssg, other);
    }

    #[test]
    fn reference_no_is_sixteen_base32_chars() {
        let code = reference_no(&Id::new(), Scope::Psych, Utc::now(), KEY);
        assert_eq!(code.len(), 16);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
