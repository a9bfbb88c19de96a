use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{PhaseKind, PhaseStatus, Scope},
    db::phase::PhaseRecord,
};

/// A request to open (or re-open) a phase until the given deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenPhaseRequest {
    pub close_at: DateTime<Utc>,
}

/// API view of a phase record.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseView {
    pub scope: Scope,
    pub kind: PhaseKind,
    pub status: PhaseStatus,
    pub close_at: DateTime<Utc>,
    pub opened_by: String,
    /// Whether the window is open right now (status AND deadline).
    pub currently_open: bool,
}

impl PhaseView {
    pub fn at(record: &PhaseRecord, now: DateTime<Utc>) -> Self {
        Self {
            scope: record.scope,
            kind: record.kind,
            status: record.status,
            close_at: record.close_at,
            opened_by: record.opened_by.clone(),
            currently_open: record.is_open_at(now),
        }
    }
}

impl From<&PhaseRecord> for PhaseView {
    fn from(record: &PhaseRecord) -> Self {
        Self::at(record, Utc::now())
    }
}
