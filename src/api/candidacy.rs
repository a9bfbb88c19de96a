use chrono::Utc;
use mongodb::{
    bson::doc,
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
};
use rocket::{futures::TryStreamExt, serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    mailer::Mailer,
    model::{
        api::{
            auth::AuthToken,
            candidacy::{CandidacyForm, CandidateView, DecisionRequest},
        },
        common::{CandidacyStatus, PhaseKind, Scope},
        db::{
            admin::Admin,
            candidate::{Candidate, NewCandidate},
            phase::PhaseRecord,
            voter::Voter,
        },
        mongodb::{is_duplicate_key, Coll},
    },
};

use super::common::{admin_by_token, voter_by_token};

pub fn routes() -> Vec<Route> {
    routes![
        submit_candidacy,
        list_candidates,
        approved_candidates,
        decide_candidacy,
    ]
}

#[post("/scopes/<scope>/candidates", data = "<form>", format = "json")]
async fn submit_candidacy(
    token: AuthToken<Voter>,
    scope: Scope,
    form: Json<CandidacyForm>,
    voters: Coll<Voter>,
    phases: Coll<PhaseRecord>,
    candidates: Coll<Candidate>,
    new_candidates: Coll<NewCandidate>,
) -> Result<Json<CandidateView>> {
    let voter = voter_by_token(&token, &voters).await?;
    let now = Utc::now();

    // The stored record is the sole authority on whether filing is open;
    // whatever countdown the client showed is irrelevant here.
    let filing = phases
        .find_one(PhaseRecord::key(scope, PhaseKind::Candidacy), None)
        .await?;
    if !filing.map(|record| record.is_open_at(now)).unwrap_or(false) {
        return Err(Error::FilingClosed(format!(
            "candidacy filing for {scope} is not open"
        )));
    }

    if !voter.eligible_for(scope) {
        return Err(Error::Ineligible(format!(
            "department {} is not part of {scope}",
            voter.department
        )));
    }

    form.validate(scope)?;
    let application = form.0.into_application(&voter, scope, now);

    // One application per student and race: a pending one is replaced in
    // place, a decided one is final.
    let existing_key = doc! {
        "student_id": &application.student_id,
        "scope": scope,
    };
    match candidates.find_one(existing_key.clone(), None).await? {
        None => {
            new_candidates
                .insert_one(&application, None)
                .await
                .map_err(|e| {
                    if is_duplicate_key(&e) {
                        Error::DuplicateApplication(format!(
                            "an application for {scope} is already on file"
                        ))
                    } else {
                        e.into()
                    }
                })?;
        }
        Some(existing) if existing.status == CandidacyStatus::Pending => {
            new_candidates
                .replace_one(existing_key, &application, None)
                .await?;
        }
        Some(existing) => {
            let decided = match existing.status {
                CandidacyStatus::Approved => "approved",
                _ => "rejected",
            };
            return Err(Error::DuplicateApplication(format!(
                "your application for {scope} was already {decided} and cannot be re-filed"
            )));
        }
    }

    Ok(Json(application.into()))
}

#[get("/scopes/<scope>/candidates?<status>")]
async fn list_candidates(
    token: AuthToken<Admin>,
    scope: Scope,
    status: Option<String>,
    admins: Coll<Admin>,
    candidates: Coll<Candidate>,
) -> Result<Json<Vec<CandidateView>>> {
    let admin = admin_by_token(&token, &admins).await?;
    if !admin.permits(scope) {
        return Err(Error::Forbidden(format!(
            "{}'s departments do not cover {scope}",
            admin.username
        )));
    }

    let mut filter = doc! { "scope": scope };
    if let Some(status) = status {
        let status = match status.to_lowercase().as_str() {
            "pending" => CandidacyStatus::Pending,
            "approved" => CandidacyStatus::Approved,
            "rejected" => CandidacyStatus::Rejected,
            other => {
                return Err(Error::InvalidInput(format!("unknown status '{other}'")));
            }
        };
        filter.insert("status", status);
    }

    let options = FindOptions::builder().sort(doc! { "filed_at": 1 }).build();
    let list: Vec<Candidate> = candidates.find(filter, options).await?.try_collect().await?;
    Ok(Json(list.into_iter().map(Into::into).collect()))
}

#[get("/scopes/<scope>/candidates/approved")]
async fn approved_candidates(
    scope: Scope,
    candidates: Coll<Candidate>,
) -> Result<Json<Vec<CandidateView>>> {
    let filter = doc! {
        "scope": scope,
        "status": CandidacyStatus::Approved,
    };
    let mut list: Vec<Candidate> = candidates.find(filter, None).await?.try_collect().await?;
    // Canonical position order, then filing order: this is the ballot form.
    list.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then(a.filed_at.cmp(&b.filed_at))
    });
    Ok(Json(list.into_iter().map(Into::into).collect()))
}

#[post(
    "/scopes/<scope>/candidates/<student_id>/decision",
    data = "<decision>",
    format = "json"
)]
async fn decide_candidacy(
    token: AuthToken<Admin>,
    scope: Scope,
    student_id: String,
    decision: Json<DecisionRequest>,
    admins: Coll<Admin>,
    candidates: Coll<Candidate>,
    voters: Coll<Voter>,
    mailer: &State<Mailer>,
) -> Result<Json<CandidateView>> {
    let admin = admin_by_token(&token, &admins).await?;
    if !admin.permits(scope) {
        return Err(Error::Forbidden(format!(
            "{}'s departments do not cover {scope}",
            admin.username
        )));
    }

    let remarks = decision.validated_remarks()?;
    let status: CandidacyStatus = decision.outcome.into();

    // Filtering on Pending makes the decision atomic and the decided states
    // terminal: a second decision finds nothing to update.
    let filter = doc! {
        "student_id": &student_id,
        "scope": scope,
        "status": CandidacyStatus::Pending,
    };
    let update = doc! {
        "$set": {
            "status": status,
            "remarks": &remarks,
            "decided_by": &admin.username,
        }
    };
    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();
    let candidate = candidates
        .find_one_and_update(filter, update, options)
        .await?
        .ok_or_else(|| {
            Error::NotFound(format!(
                "no pending application for student {student_id} in {scope}"
            ))
        })?;

    // Tell the applicant. The decision above already stands; a notification
    // failure is logged and swallowed.
    match voters
        .find_one(doc! { "student_id": &student_id }, None)
        .await
    {
        Ok(Some(voter)) => {
            let subject = format!("Your {scope} candidacy application");
            let body = match status {
                CandidacyStatus::Approved => format!(
                    "Your application for {} in the {scope} race has been approved.",
                    candidate.position
                ),
                _ => format!(
                    "Your application for {} in the {scope} race has been rejected. \
Remarks: {remarks}",
                    candidate.position
                ),
            };
            mailer.send(&voter.email, subject, body);
        }
        Ok(None) => {
            warn!("no voter record for applicant {student_id}; skipping notification");
        }
        Err(e) => {
            warn!("could not look up applicant {student_id} for notification: {e}");
        }
    }

    Ok(Json(candidate.into()))
}
