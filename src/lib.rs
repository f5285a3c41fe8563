#[macro_use]
extern crate log;
#[macro_use]
extern crate rocket;

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod store;

use rocket::{Build, Rocket};

/// Build the server: all routes mounted and fairings attached, ready to launch.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(logging::LoggerFairing)
        .attach(config::DatabaseFairing)
}
