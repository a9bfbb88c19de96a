#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod mailer;
pub mod model;
pub mod scheduled_task;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, DatabaseFairing, MailerFairing};
use crate::logging::LoggerFairing;
use crate::model::db::phase::PhaseCloserFairing;

pub use crate::config::Config;

/// Construct the server: routes mounted and fairings attached, ready to
/// ignite. The phase-closer fairing needs the database and must stay after
/// the database fairing.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .attach(MailerFairing)
        .attach(PhaseCloserFairing)
        .attach(LoggerFairing)
}
