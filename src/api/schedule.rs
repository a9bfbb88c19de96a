use chrono::Utc;
use mongodb::{
    bson::{doc, DateTime as BsonDateTime},
    options::{FindOneAndUpdateOptions, ReplaceOptions, ReturnDocument},
};
use rocket::{serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            auth::AuthToken,
            phase::{OpenPhaseRequest, PhaseView},
        },
        common::{PhaseKind, PhaseStatus, Scope},
        db::{
            admin::Admin,
            phase::{validate_open, PhaseClosers, PhaseRecord},
        },
        mongodb::Coll,
    },
};

use super::common::admin_by_token;

pub fn routes() -> Vec<Route> {
    routes![get_phase, open_phase, close_phase]
}

#[get("/scopes/<scope>/phases/<kind>")]
async fn get_phase(
    scope: Scope,
    kind: PhaseKind,
    phases: Coll<PhaseRecord>,
) -> Result<Json<PhaseView>> {
    // "Not scheduled" is distinct from "closed": the former is a 404 with
    // its own guidance, the latter a normal record.
    let record = phases
        .find_one(PhaseRecord::key(scope, kind), None)
        .await?
        .ok_or_else(|| {
            Error::NotFound(format!("{kind} for {scope} has not been scheduled yet"))
        })?;
    Ok(Json(PhaseView::from(&record)))
}

#[post("/scopes/<scope>/phases/<kind>/open", data = "<request>", format = "json")]
async fn open_phase(
    token: AuthToken<Admin>,
    scope: Scope,
    kind: PhaseKind,
    request: Json<OpenPhaseRequest>,
    admins: Coll<Admin>,
    phases: Coll<PhaseRecord>,
    closers: &State<PhaseClosers>,
) -> Result<Json<PhaseView>> {
    let admin = admin_by_token(&token, &admins).await?;
    if !admin.permits(scope) {
        return Err(Error::Forbidden(format!(
            "{}'s departments do not cover {scope}",
            admin.username
        )));
    }

    let now = Utc::now();
    let candidacy = if kind == PhaseKind::Election {
        phases
            .find_one(PhaseRecord::key(scope, PhaseKind::Candidacy), None)
            .await?
    } else {
        None
    };
    validate_open(scope, kind, request.close_at, now, candidacy.as_ref())?;

    // Last write wins on concurrent opens; the upsert keeps (scope, kind)
    // unique either way.
    let record = PhaseRecord::open(scope, kind, request.close_at, admin.username.clone());
    let options = ReplaceOptions::builder().upsert(true).build();
    phases
        .replace_one(PhaseRecord::key(scope, kind), &record, options)
        .await?;
    closers.schedule(phases.clone(), &record).await;

    info!(
        "{} opened {kind} for {scope} until {}",
        admin.username, record.close_at
    );
    Ok(Json(PhaseView::from(&record)))
}

#[post("/scopes/<scope>/phases/<kind>/close")]
async fn close_phase(
    token: AuthToken<Admin>,
    scope: Scope,
    kind: PhaseKind,
    admins: Coll<Admin>,
    phases: Coll<PhaseRecord>,
    closers: &State<PhaseClosers>,
) -> Result<Json<PhaseView>> {
    let admin = admin_by_token(&token, &admins).await?;
    if !admin.permits(scope) {
        return Err(Error::Forbidden(format!(
            "{}'s departments do not cover {scope}",
            admin.username
        )));
    }

    let record = phases
        .find_one(PhaseRecord::key(scope, kind), None)
        .await?
        .ok_or_else(|| {
            Error::NotFound(format!("{kind} for {scope} has never been scheduled"))
        })?;

    // Closing an already-closed phase is a no-op success.
    if record.status == PhaseStatus::Closed {
        return Ok(Json(PhaseView::from(&record)));
    }

    // Manual closure ends the window immediately: close_at becomes "now",
    // overriding the scheduled deadline.
    let filter = doc! {
        "scope": scope,
        "kind": kind,
        "status": PhaseStatus::Open,
    };
    let update = doc! {
        "$set": {
            "status": PhaseStatus::Closed,
            "close_at": BsonDateTime::from_chrono(Utc::now()),
        }
    };
    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();
    let updated = phases.find_one_and_update(filter, update, options).await?;
    closers.cancel(scope, kind).await;

    let record = match updated {
        Some(record) => record,
        // Lost a race against another close; read back whatever won.
        None => phases
            .find_one(PhaseRecord::key(scope, kind), None)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("{kind} for {scope} has never been scheduled"))
            })?,
    };

    info!("{} closed {kind} for {scope}", admin.username);
    Ok(Json(PhaseView::from(&record)))
}
