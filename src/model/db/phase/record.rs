use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::common::{PhaseKind, PhaseStatus, Scope};

/// The scheduling state of one phase of one scope. There is at most one
/// record per (scope, kind); a missing record means the phase has never been
/// scheduled, which is distinct from a closed one. Records are never deleted;
/// closing rewrites `status` in place.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub scope: Scope,
    pub kind: PhaseKind,
    pub status: PhaseStatus,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub close_at: DateTime<Utc>,
    /// Username of the admin who last opened this phase.
    pub opened_by: String,
}

impl PhaseRecord {
    /// A freshly-opened record.
    pub fn open(scope: Scope, kind: PhaseKind, close_at: DateTime<Utc>, opened_by: String) -> Self {
        Self {
            scope,
            kind,
            status: PhaseStatus::Open,
            close_at,
            opened_by,
        }
    }

    /// Filter matching the unique record for this scope and kind.
    pub fn key(scope: Scope, kind: PhaseKind) -> Document {
        doc! { "scope": scope, "kind": kind }
    }

    /// The one definition of "open": the status says so AND the deadline has
    /// not passed. Client-side countdowns are presentation only; every
    /// mutating operation re-checks here against the stored record.
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.status == PhaseStatus::Open && now < self.close_at
    }
}

/// Validate an open request before anything is written.
///
/// `candidacy` is the scope's current candidacy record, consulted only when
/// opening the election phase: voting may not start until filing has been
/// scheduled at least once and is closed. The status field alone decides
/// this; an open-but-expired filing window still blocks until its closer
/// lands, and the admin is told to close it.
pub fn validate_open(
    scope: Scope,
    kind: PhaseKind,
    close_at: DateTime<Utc>,
    now: DateTime<Utc>,
    candidacy: Option<&PhaseRecord>,
) -> Result<(), Error> {
    if close_at <= now {
        return Err(Error::InvalidInput(format!(
            "close time {close_at} is not in the future"
        )));
    }

    if kind == PhaseKind::Election {
        match candidacy {
            None => {
                return Err(Error::InvalidTransition(format!(
                    "candidacy filing for {scope} has never been scheduled; \
open and close it before opening the election"
                )));
            }
            Some(record) if record.status == PhaseStatus::Open => {
                return Err(Error::InvalidTransition(format!(
                    "candidacy filing for {scope} is still open; close it before \
opening the election"
                )));
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use chrono::Duration;

    use super::*;

    impl PhaseRecord {
        pub fn open_example(scope: Scope, kind: PhaseKind) -> Self {
            Self::open(
                scope,
                kind,
                Utc::now() + Duration::hours(1),
                "ccs-coordinator".to_string(),
            )
        }

        pub fn closed_example(scope: Scope, kind: PhaseKind) -> Self {
            Self {
                status: PhaseStatus::Closed,
                ..Self::open_example(scope, kind)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn open_requires_future_close_time() {
        let now = Utc::now();
        let err = validate_open(Scope::Ssg, PhaseKind::Candidacy, now, now, None).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        let err = validate_open(
            Scope::Ssg,
            PhaseKind::Candidacy,
            now - Duration::minutes(5),
            now,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        validate_open(
            Scope::Ssg,
            PhaseKind::Candidacy,
            now + Duration::minutes(5),
            now,
            None,
        )
        .unwrap();
    }

    #[test]
    fn election_needs_candidacy_scheduled_and_closed() {
        let now = Utc::now();
        let close_at = now + Duration::hours(1);

        // Never scheduled: blocked.
        let err =
            validate_open(Scope::Bsit, PhaseKind::Election, close_at, now, None).unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(_)));

        // Still open: blocked.
        let filing = PhaseRecord::open_example(Scope::Bsit, PhaseKind::Candidacy);
        let err = validate_open(Scope::Bsit, PhaseKind::Election, close_at, now, Some(&filing))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(_)));

        // Closed: allowed.
        let filing = PhaseRecord::closed_example(Scope::Bsit, PhaseKind::Candidacy);
        validate_open(Scope::Bsit, PhaseKind::Election, close_at, now, Some(&filing)).unwrap();
    }

    #[test]
    fn candidacy_never_consults_the_election_phase() {
        let now = Utc::now();
        validate_open(
            Scope::Beed,
            PhaseKind::Candidacy,
            now + Duration::hours(1),
            now,
            None,
        )
        .unwrap();
    }

    #[test]
    fn openness_needs_both_status_and_deadline() {
        let now = Utc::now();
        let record = PhaseRecord::open_example(Scope::Ssg, PhaseKind::Election);
        assert!(record.is_open_at(now));
        // Deadline passed but status still open: not open.
        assert!(!record.is_open_at(record.close_at));
        assert!(!record.is_open_at(record.close_at + Duration::seconds(1)));
        // Status closed, deadline in the future: not open.
        let record = PhaseRecord::closed_example(Scope::Ssg, PhaseKind::Election);
        assert!(!record.is_open_at(now));
    }
}
