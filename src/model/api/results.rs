use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{
    common::{Position, Scope},
    db::{ballot::BallotCore, candidate::CandidateCore},
};

/// One line of a ranked result list.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub name: String,
    pub votes: u64,
}

/// Ranked per-position results for one scope. Positions appear in canonical
/// display order (the `BTreeMap` key order) and only when they have at least
/// one approved candidate.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeResults {
    pub scope: Scope,
    pub ballots_cast: u64,
    pub results: BTreeMap<Position, Vec<RankedCandidate>>,
}

/// Demographic breakdown of the ballots cast in one scope.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeStatistics {
    pub scope: Scope,
    pub registered_voters: u64,
    pub ballots_cast: u64,
    pub by_department: BTreeMap<String, u64>,
}

/// Rank the approved candidates of a scope by the ballots cast for them.
///
/// A pure read-side projection: candidates within a position are ordered by
/// descending vote count, with ties resolved by filing order (earliest
/// application first) so the ranking is deterministic.
pub fn tally(scope: Scope, approved: &[CandidateCore], ballots: &[BallotCore]) -> ScopeResults {
    let positions: BTreeSet<Position> = approved.iter().map(|c| c.position).collect();

    let mut results = BTreeMap::new();
    for &position in &positions {
        let mut runners: Vec<&CandidateCore> = approved
            .iter()
            .filter(|candidate| candidate.position == position)
            .collect();
        runners.sort_by_key(|candidate| candidate.filed_at);

        let mut ranked: Vec<RankedCandidate> = runners
            .into_iter()
            .map(|candidate| RankedCandidate {
                votes: ballots
                    .iter()
                    .filter(|ballot| ballot.selections.get(&position) == Some(&candidate.name))
                    .count() as u64,
                name: candidate.name.clone(),
            })
            .collect();
        // Stable sort: equal vote counts keep their filing order.
        ranked.sort_by(|a, b| b.votes.cmp(&a.votes));

        results.insert(position, ranked);
    }

    ScopeResults {
        scope,
        ballots_cast: ballots.len() as u64,
        results,
    }
}

/// Break the cast ballots down by the voters' home departments.
pub fn statistics(
    scope: Scope,
    registered_voters: u64,
    ballots: &[BallotCore],
) -> ScopeStatistics {
    let mut by_department = BTreeMap::new();
    for ballot in ballots {
        *by_department.entry(ballot.department.clone()).or_insert(0) += 1;
    }
    ScopeStatistics {
        scope,
        registered_voters,
        ballots_cast: ballots.len() as u64,
        by_department,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{Duration, Utc};

    use crate::model::mongodb::Id;

    use super::*;

    fn ballot(scope: Scope, department: &str, picks: &[(Position, &str)]) -> BallotCore {
        BallotCore {
            voter_id: Id::new(),
            student_id: "2021-00000".to_string(),
            department: department.to_string(),
            scope,
            selections: picks
                .iter()
                .map(|(position, name)| (*position, name.to_string()))
                .collect::<HashMap<_, _>>(),
            cast_at: Utc::now(),
            reference_no: "TESTREF".to_string(),
        }
    }

    #[test]
    fn candidates_rank_by_descending_votes() {
        let now = Utc::now();
        let approved = vec![
            CandidateCore::approved_example("Maria Santos", Scope::Ssg, Position::President, now),
            CandidateCore::approved_example(
                "Jose Ramirez",
                Scope::Ssg,
                Position::President,
                now + Duration::minutes(1),
            ),
        ];
        let ballots = vec![
            ballot(Scope::Ssg, "BSIT", &[(Position::President, "Jose Ramirez")]),
            ballot(Scope::Ssg, "BEED", &[(Position::President, "Jose Ramirez")]),
            ballot(Scope::Ssg, "BSA", &[(Position::President, "Maria Santos")]),
        ];

        let results = tally(Scope::Ssg, &approved, &ballots);
        assert_eq!(results.ballots_cast, 3);
        let president = &results.results[&Position::President];
        assert_eq!(
            president,
            &vec![
                RankedCandidate {
                    name: "Jose Ramirez".to_string(),
                    votes: 2
                },
                RankedCandidate {
                    name: "Maria Santos".to_string(),
                    votes: 1
                },
            ]
        );
    }

    #[test]
    fn ties_break_by_filing_order() {
        let now = Utc::now();
        // Jose filed first, Maria second; both end up with one vote.
        let approved = vec![
            CandidateCore::approved_example(
                "Maria Santos",
                Scope::Ssg,
                Position::President,
                now + Duration::minutes(5),
            ),
            CandidateCore::approved_example("Jose Ramirez", Scope::Ssg, Position::President, now),
        ];
        let ballots = vec![
            ballot(Scope::Ssg, "BSIT", &[(Position::President, "Maria Santos")]),
            ballot(Scope::Ssg, "BSIT", &[(Position::President, "Jose Ramirez")]),
        ];

        let results = tally(Scope::Ssg, &approved, &ballots);
        let president = &results.results[&Position::President];
        assert_eq!(president[0].name, "Jose Ramirez");
        assert_eq!(president[1].name, "Maria Santos");
    }

    #[test]
    fn positions_without_candidates_are_absent() {
        let now = Utc::now();
        let approved = vec![CandidateCore::approved_example(
            "Ana Cruz",
            Scope::Bsit,
            Position::Secretary,
            now,
        )];
        let results = tally(Scope::Bsit, &approved, &[]);
        assert!(results.results.contains_key(&Position::Secretary));
        assert!(!results.results.contains_key(&Position::President));
        assert_eq!(results.results[&Position::Secretary][0].votes, 0);
    }

    #[test]
    fn single_winner_scenario() {
        // Candidacy opened, one candidate approved, one ballot cast:
        // the tally shows that candidate on top with one vote.
        let approved = vec![CandidateCore::approved_example(
            "Maria Santos",
            Scope::Ssg,
            Position::President,
            Utc::now(),
        )];
        let ballots = vec![ballot(
            Scope::Ssg,
            "BSIT",
            &[(Position::President, "Maria Santos")],
        )];
        let results = tally(Scope::Ssg, &approved, &ballots);
        assert_eq!(
            results.results[&Position::President][0],
            RankedCandidate {
                name: "Maria Santos".to_string(),
                votes: 1
            }
        );
    }

    #[test]
    fn statistics_break_down_by_department() {
        let ballots = vec![
            ballot(Scope::Ssg, "BSIT", &[]),
            ballot(Scope::Ssg, "BSIT", &[]),
            ballot(Scope::Ssg, "BEED", &[]),
        ];
        let stats = statistics(Scope::Ssg, 10, &ballots);
        assert_eq!(stats.registered_voters, 10);
        assert_eq!(stats.ballots_cast, 3);
        assert_eq!(stats.by_department["BSIT"], 2);
        assert_eq!(stats.by_department["BEED"], 1);
    }
}
