use chrono::Utc;
use mongodb::bson::doc;
use rocket::{futures::TryStreamExt, serde::json::Json, Route, State};

use crate::{
    config::Config,
    error::{Error, Result},
    model::{
        api::{
            auth::AuthToken,
            ballot::{validate_selections, BallotPaper},
            receipt::VoteReceipt,
        },
        common::{CandidacyStatus, PhaseKind, Scope},
        db::{
            ballot::{Ballot, BallotCore, NewBallot},
            candidate::{Candidate, CandidateCore},
            phase::PhaseRecord,
            voter::Voter,
        },
        mongodb::{is_duplicate_key, Coll},
    },
};

use super::common::voter_by_token;

pub fn routes() -> Vec<Route> {
    routes![cast_ballot, ballot_receipt]
}

#[post("/scopes/<scope>/ballots", data = "<paper>", format = "json")]
async fn cast_ballot(
    token: AuthToken<Voter>,
    scope: Scope,
    paper: Json<BallotPaper>,
    voters: Coll<Voter>,
    phases: Coll<PhaseRecord>,
    candidates: Coll<Candidate>,
    ballots: Coll<NewBallot>,
    config: &State<Config>,
) -> Result<Json<VoteReceipt>> {
    let voter = voter_by_token(&token, &voters).await?;
    let now = Utc::now();

    // Face verification on the client merely enables the submit button; the
    // checks that matter all happen here, against stored state.
    let election = phases
        .find_one(PhaseRecord::key(scope, PhaseKind::Election), None)
        .await?;
    if !election.map(|record| record.is_open_at(now)).unwrap_or(false) {
        return Err(Error::VotingClosed(format!("voting for {scope} is not open")));
    }

    if !voter.eligible_for(scope) {
        return Err(Error::Ineligible(format!(
            "department {} is not part of {scope}",
            voter.department
        )));
    }

    let approved: Vec<CandidateCore> = candidates
        .find(
            doc! { "scope": scope, "status": CandidacyStatus::Approved },
            None,
        )
        .await?
        .map_ok(|candidate| candidate.candidate)
        .try_collect()
        .await?;
    if approved.is_empty() {
        return Err(Error::VotingClosed(format!(
            "there are no approved candidates for {scope}"
        )));
    }
    let selections = validate_selections(&approved, &paper.selections)?;

    // The unique (voter, scope) index is what actually prevents double
    // voting; hiding the form client-side after voting is cosmetic.
    let ballot = BallotCore::new(&voter, scope, selections, now, config.hmac_secret());
    ballots.insert_one(&ballot, None).await.map_err(|e| {
        if is_duplicate_key(&e) {
            Error::DuplicateVote(format!("a ballot for {scope} has already been cast"))
        } else {
            e.into()
        }
    })?;

    info!(
        "ballot {} cast in {scope} by voter {}",
        ballot.reference_no, ballot.student_id
    );
    Ok(Json(VoteReceipt::from(&ballot)))
}

#[get("/scopes/<scope>/ballots/receipt")]
async fn ballot_receipt(
    token: AuthToken<Voter>,
    scope: Scope,
    ballots: Coll<Ballot>,
) -> Result<Json<VoteReceipt>> {
    let filter = doc! {
        "voter_id": *token.id,
        "scope": scope,
    };
    let ballot = ballots
        .find_one(filter, None)
        .await?
        .ok_or_else(|| Error::NotFound(format!("no ballot cast for {scope}")))?;
    Ok(Json(VoteReceipt::from(&ballot.ballot)))
}
