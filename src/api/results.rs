use mongodb::bson::doc;
use rocket::{futures::TryStreamExt, serde::json::Json, Route};

use crate::{
    error::Result,
    model::{
        api::results::{statistics, tally, ScopeResults, ScopeStatistics},
        common::{CandidacyStatus, Scope},
        db::{
            ballot::{Ballot, BallotCore},
            candidate::{Candidate, CandidateCore},
            voter::Voter,
        },
        mongodb::Coll,
    },
};

pub fn routes() -> Vec<Route> {
    routes![scope_results, scope_statistics]
}

#[get("/scopes/<scope>/results")]
async fn scope_results(
    scope: Scope,
    candidates: Coll<Candidate>,
    ballots: Coll<Ballot>,
) -> Result<Json<ScopeResults>> {
    let approved: Vec<CandidateCore> = candidates
        .find(
            doc! { "scope": scope, "status": CandidacyStatus::Approved },
            None,
        )
        .await?
        .map_ok(|candidate| candidate.candidate)
        .try_collect()
        .await?;
    let cast: Vec<BallotCore> = ballots
        .find(doc! { "scope": scope }, None)
        .await?
        .map_ok(|ballot| ballot.ballot)
        .try_collect()
        .await?;

    Ok(Json(tally(scope, &approved, &cast)))
}

#[get("/scopes/<scope>/statistics")]
async fn scope_statistics(
    scope: Scope,
    voters: Coll<Voter>,
    ballots: Coll<Ballot>,
) -> Result<Json<ScopeStatistics>> {
    // SSG counts the whole electorate; a department race only its own.
    let registered = if scope.is_global() {
        voters.count_documents(None, None).await?
    } else {
        voters
            .count_documents(doc! { "department": scope.name() }, None)
            .await?
    };
    let cast: Vec<BallotCore> = ballots
        .find(doc! { "scope": scope }, None)
        .await?
        .map_ok(|ballot| ballot.ballot)
        .try_collect()
        .await?;

    Ok(Json(statistics(scope, registered, &cast)))
}
