use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::{common::Position, db::candidate::CandidateCore};

/// A filled-in ballot, as submitted by a voter: one chosen candidate display
/// name per position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallotPaper {
    pub selections: HashMap<Position, String>,
}

/// Check a ballot against the approved candidates of its scope and return
/// the selections to persist.
///
/// The ballot position set is derived from `approved` (which the caller has
/// already filtered to the scope): every position with at least one approved
/// candidate must carry exactly one non-empty choice, and each choice must
/// name an approved candidate for that position. Keys for positions outside
/// the set are dropped, not errors, so a stale client form cannot block a
/// valid ballot.
pub fn validate_selections(
    approved: &[CandidateCore],
    selections: &HashMap<Position, String>,
) -> Result<HashMap<Position, String>, Error> {
    let positions: BTreeSet<Position> = approved.iter().map(|c| c.position).collect();

    let mut accepted = HashMap::new();
    for &position in &positions {
        let choice = selections
            .get(&position)
            .map(|choice| choice.trim())
            .filter(|choice| !choice.is_empty())
            .ok_or_else(|| Error::IncompleteBallot(format!("no choice for {position}")))?;

        let is_approved = approved
            .iter()
            .any(|candidate| candidate.position == position && candidate.name == choice);
        if !is_approved {
            return Err(Error::InvalidChoice(format!(
                "'{choice}' is not an approved candidate for {position}"
            )));
        }

        accepted.insert(position, choice.to_string());
    }

    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::model::common::Scope;

    use super::*;

    fn approved() -> Vec<CandidateCore> {
        let now = Utc::now();
        vec![
            CandidateCore::approved_example("Maria Santos", Scope::Ssg, Position::President, now),
            CandidateCore::approved_example("Jose Ramirez", Scope::Ssg, Position::President, now),
            CandidateCore::approved_example("Ana Cruz", Scope::Ssg, Position::Secretary, now),
        ]
    }

    fn selections(pairs: &[(Position, &str)]) -> HashMap<Position, String> {
        pairs
            .iter()
            .map(|(position, name)| (*position, name.to_string()))
            .collect()
    }

    #[test]
    fn complete_ballot_accepted() {
        let accepted = validate_selections(
            &approved(),
            &selections(&[
                (Position::President, "Maria Santos"),
                (Position::Secretary, "Ana Cruz"),
            ]),
        )
        .unwrap();
        assert_eq!(accepted.len(), 2);
        assert_eq!(accepted[&Position::President], "Maria Santos");
    }

    #[test]
    fn missing_position_is_incomplete() {
        let err = validate_selections(
            &approved(),
            &selections(&[(Position::President, "Maria Santos")]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::IncompleteBallot(_)));
    }

    #[test]
    fn empty_choice_is_incomplete() {
        let err = validate_selections(
            &approved(),
            &selections(&[
                (Position::President, "Maria Santos"),
                (Position::Secretary, "  "),
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::IncompleteBallot(_)));
    }

    #[test]
    fn unknown_candidate_is_invalid_choice() {
        let err = validate_selections(
            &approved(),
            &selections(&[
                (Position::President, "Maria Santos"),
                (Position::Secretary, "Nobody Inparticular"),
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidChoice(_)));
    }

    #[test]
    fn candidate_on_wrong_position_is_invalid_choice() {
        // Ana Cruz is approved, but for secretary.
        let err = validate_selections(
            &approved(),
            &selections(&[
                (Position::President, "Ana Cruz"),
                (Position::Secretary, "Ana Cruz"),
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidChoice(_)));
    }

    #[test]
    fn extra_keys_for_uncontested_positions_are_dropped() {
        let accepted = validate_selections(
            &approved(),
            &selections(&[
                (Position::President, "Maria Santos"),
                (Position::Secretary, "Ana Cruz"),
                (Position::Treasurer, "Someone Stale"),
            ]),
        )
        .unwrap();
        assert!(!accepted.contains_key(&Position::Treasurer));
        assert_eq!(accepted.len(), 2);
    }
}
