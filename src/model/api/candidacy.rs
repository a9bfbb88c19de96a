use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::{
    common::{CandidacyStatus, Position, Scope},
    db::{
        candidate::{Candidate, CandidateCore},
        voter::Voter,
    },
};

/// A candidacy filing, as submitted by a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidacyForm {
    pub position: Position,
    #[serde(default)]
    pub party: String,
    pub about_yourself: String,
    pub purpose: String,
    pub image: Option<String>,
}

impl CandidacyForm {
    /// Check the required free-text fields and that the position is actually
    /// contested in the target scope.
    pub fn validate(&self, scope: Scope) -> Result<(), Error> {
        if self.about_yourself.trim().is_empty() {
            return Err(Error::InvalidInput(
                "'about yourself' must not be empty".to_string(),
            ));
        }
        if self.purpose.trim().is_empty() {
            return Err(Error::InvalidInput("'purpose' must not be empty".to_string()));
        }
        if !self.position.contested_in(scope) {
            return Err(Error::InvalidInput(format!(
                "{} is not contested in {scope}",
                self.position
            )));
        }
        Ok(())
    }

    /// Turn a validated form into a pending application for the given voter.
    pub fn into_application(
        self,
        voter: &Voter,
        scope: Scope,
        filed_at: DateTime<Utc>,
    ) -> CandidateCore {
        CandidateCore {
            student_id: voter.student_id.clone(),
            scope,
            name: voter.full_name.clone(),
            position: self.position,
            party: self.party,
            about_yourself: self.about_yourself,
            purpose: self.purpose,
            image: self.image,
            status: CandidacyStatus::Pending,
            remarks: String::new(),
            filed_at,
            decided_by: None,
        }
    }
}

/// An admin's verdict on a pending application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum DecisionOutcome {
    Approved,
    Rejected,
}

impl From<DecisionOutcome> for CandidacyStatus {
    fn from(outcome: DecisionOutcome) -> Self {
        match outcome {
            DecisionOutcome::Approved => CandidacyStatus::Approved,
            DecisionOutcome::Rejected => CandidacyStatus::Rejected,
        }
    }
}

/// A decision request on a pending application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub outcome: DecisionOutcome,
    #[serde(default)]
    pub remarks: String,
}

impl DecisionRequest {
    /// Rejections must say why; approvals carry no remarks.
    /// Returns the remarks to store.
    pub fn validated_remarks(&self) -> Result<String, Error> {
        match self.outcome {
            DecisionOutcome::Rejected => {
                let remarks = self.remarks.trim();
                if remarks.is_empty() {
                    Err(Error::InvalidInput(
                        "remarks are required when rejecting an application".to_string(),
                    ))
                } else {
                    Ok(remarks.to_string())
                }
            }
            DecisionOutcome::Approved => Ok(String::new()),
        }
    }
}

/// Public/admin view of an application.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateView {
    pub student_id: String,
    pub scope: Scope,
    pub name: String,
    pub position: Position,
    pub party: String,
    pub about_yourself: String,
    pub purpose: String,
    pub image: Option<String>,
    pub status: CandidacyStatus,
    pub remarks: String,
    pub filed_at: DateTime<Utc>,
}

impl From<CandidateCore> for CandidateView {
    fn from(candidate: CandidateCore) -> Self {
        Self {
            student_id: candidate.student_id,
            scope: candidate.scope,
            name: candidate.name,
            position: candidate.position,
            party: candidate.party,
            about_yourself: candidate.about_yourself,
            purpose: candidate.purpose,
            image: candidate.image,
            status: candidate.status,
            remarks: candidate.remarks,
            filed_at: candidate.filed_at,
        }
    }
}

impl From<Candidate> for CandidateView {
    fn from(candidate: Candidate) -> Self {
        candidate.candidate.into()
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl CandidacyForm {
        pub fn example() -> Self {
            Self {
                position: Position::President,
                party: "Unity Party".to_string(),
                about_yourself: "Third-year BSIT student, dean's lister.".to_string(),
                purpose: "Modernise student services.".to_string(),
                image: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_requires_about_and_purpose() {
        let form = CandidacyForm {
            about_yourself: "  ".to_string(),
            ..CandidacyForm::example()
        };
        assert!(matches!(
            form.validate(Scope::Ssg),
            Err(Error::InvalidInput(_))
        ));

        let form = CandidacyForm {
            purpose: String::new(),
            ..CandidacyForm::example()
        };
        assert!(matches!(
            form.validate(Scope::Ssg),
            Err(Error::InvalidInput(_))
        ));

        CandidacyForm::example().validate(Scope::Ssg).unwrap();
    }

    #[test]
    fn party_is_optional() {
        let form = CandidacyForm {
            party: String::new(),
            ..CandidacyForm::example()
        };
        form.validate(Scope::Bsit).unwrap();
    }

    #[test]
    fn auditor_filing_rejected_outside_ssg() {
        let form = CandidacyForm {
            position: Position::Auditor,
            ..CandidacyForm::example()
        };
        form.validate(Scope::Ssg).unwrap();
        assert!(matches!(
            form.validate(Scope::Criminology),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn rejection_requires_remarks() {
        let decision = DecisionRequest {
            outcome: DecisionOutcome::Rejected,
            remarks: String::new(),
        };
        assert!(matches!(
            decision.validated_remarks(),
            Err(Error::InvalidInput(_))
        ));

        let decision = DecisionRequest {
            outcome: DecisionOutcome::Rejected,
            remarks: "needs more detail".to_string(),
        };
        assert_eq!(decision.validated_remarks().unwrap(), "needs more detail");
    }

    #[test]
    fn approval_clears_remarks() {
        let decision = DecisionRequest {
            outcome: DecisionOutcome::Approved,
            remarks: "irrelevant".to_string(),
        };
        assert_eq!(decision.validated_remarks().unwrap(), "");
    }
}
