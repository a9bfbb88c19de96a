use mongodb::bson::doc;
use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    config::Config,
    error::{Error, Result},
    model::{
        api::{
            admin::AdminCredentials,
            auth::{AuthToken, AUTH_TOKEN_COOKIE},
            voter::{VoterCredentials, VoterRegistration},
        },
        db::{
            admin::Admin,
            voter::{NewVoter, Voter},
        },
        mongodb::{is_duplicate_key, Coll},
    },
};

pub fn routes() -> Vec<Route> {
    routes![authenticate_admin, authenticate_voter, register_voter, logout]
}

#[post("/auth/admin", data = "<credentials>", format = "json")]
async fn authenticate_admin(
    cookies: &CookieJar<'_>,
    credentials: Json<AdminCredentials>,
    admins: Coll<Admin>,
    config: &State<Config>,
) -> Result<()> {
    let with_username = doc! {
        "username": &credentials.username,
    };

    let admin = admins
        .find_one(with_username, None)
        .await?
        .filter(|admin| admin.verify_password(&credentials.password))
        .ok_or_else(|| {
            Error::Unauthorized(
                "No admin found with the provided username and password combination.".to_string(),
            )
        })?;

    let token = AuthToken::new(&admin);
    cookies.add(token.into_cookie(config));

    Ok(())
}

#[post("/auth/voter", data = "<credentials>", format = "json")]
async fn authenticate_voter(
    cookies: &CookieJar<'_>,
    credentials: Json<VoterCredentials>,
    voters: Coll<Voter>,
    config: &State<Config>,
) -> Result<()> {
    let with_student_id = doc! {
        "student_id": &credentials.student_id,
    };

    let voter = voters
        .find_one(with_student_id, None)
        .await?
        .filter(|voter| voter.verify_password(&credentials.password))
        .ok_or_else(|| {
            Error::Unauthorized(
                "No voter found with the provided student number and password combination."
                    .to_string(),
            )
        })?;

    let token = AuthToken::new(&voter);
    cookies.add(token.into_cookie(config));

    Ok(())
}

#[post("/voters/register", data = "<registration>", format = "json")]
async fn register_voter(
    registration: Json<VoterRegistration>,
    new_voters: Coll<NewVoter>,
) -> Result<()> {
    let voter: NewVoter = registration.0.try_into()?;

    // The unique student_id index is the real duplicate check; a racing
    // second registration loses cleanly here.
    new_voters.insert_one(&voter, None).await.map_err(|e| {
        if is_duplicate_key(&e) {
            Error::InvalidInput(format!(
                "student number {} is already registered",
                voter.student_id
            ))
        } else {
            e.into()
        }
    })?;

    Ok(())
}

#[delete("/auth")]
fn logout(cookies: &CookieJar) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}
