use rocket::Route;

mod admin;
mod auth;
mod candidacy;
mod common;
mod results;
mod schedule;
mod voting;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(auth::routes());
    routes.extend(admin::routes());
    routes.extend(schedule::routes());
    routes.extend(candidacy::routes());
    routes.extend(voting::routes());
    routes.extend(results::routes());
    routes
}
