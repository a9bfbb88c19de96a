use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{CandidacyStatus, Position, Scope},
    mongodb::Id,
};

/// A candidate application, as stored in the database.
/// Exactly one exists per (student, scope); re-filing while the window is
/// open replaces a pending application in place.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct CandidateCore {
    pub student_id: String,
    pub scope: Scope,
    /// Display name on the ballot, copied from the voter record at filing time.
    pub name: String,
    pub position: Position,
    pub party: String,
    pub about_yourself: String,
    pub purpose: String,
    /// Optional portrait URL.
    pub image: Option<String>,
    pub status: CandidacyStatus,
    /// Approver remarks; non-empty exactly when the application was rejected.
    pub remarks: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub filed_at: DateTime<Utc>,
    /// Username of the admin who decided the application, once decided.
    pub decided_by: Option<String>,
}

/// An application without an ID.
pub type NewCandidate = CandidateCore;

/// An application from the database, with its unique ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub candidate: CandidateCore,
}

impl Deref for Candidate {
    type Target = CandidateCore;

    fn deref(&self) -> &Self::Target {
        &self.candidate
    }
}

impl DerefMut for Candidate {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.candidate
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl CandidateCore {
        pub fn approved_example(
            name: &str,
            scope: Scope,
            position: Position,
            filed_at: DateTime<Utc>,
        ) -> Self {
            Self {
                student_id: format!("sid-{name}"),
                scope,
                name: name.to_string(),
                position,
                party: "Independent".to_string(),
                about_yourself: "Third-year student".to_string(),
                purpose: "Serve the student body".to_string(),
                image: None,
                status: CandidacyStatus::Approved,
                remarks: String::new(),
                filed_at,
                decided_by: Some("ccs-coordinator".to_string()),
            }
        }
    }
}
