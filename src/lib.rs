mod auth;
mod config;
mod database;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod service;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;

use crate::db::stage_db;
use crate::middleware::{RequestLogger, SessionSweeper};
use crate::routes as app_routes;
use rocket::{Build, Rocket, catchers};
use tracing_subscriber::EnvFilter;

fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG overrides the configured level, e.g. RUST_LOG=info,shelfwise::routes=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    // A subscriber may already be installed when several instances are built in one process.
    let _ = if json_format { subscriber.json().try_init() } else { subscriber.try_init() };
}

pub fn build_rocket(config: Config) -> Rocket<Build> {
    init_tracing(&config.logging.level, config.logging.json_format);

    let figment = rocket::Config::figment()
        .merge(("address", config.server.address.clone()))
        .merge(("port", config.server.port));

    rocket::custom(figment)
        .manage(config.session.clone())
        .manage(config.pagination.clone())
        .attach(RequestLogger)
        .attach(stage_db(config.database, config.bootstrap))
        .attach(SessionSweeper)
        .mount("/", app_routes::user::routes())
        .mount("/", app_routes::book::routes())
        .mount("/health", app_routes::health::routes())
        .register(
            "/",
            catchers![
                app_routes::error::bad_request,
                app_routes::error::unauthorized,
                app_routes::error::not_found,
                app_routes::error::conflict,
                app_routes::error::unprocessable_entity,
                app_routes::error::internal_error
            ],
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_config;
    use rocket::http::Status;
    use rocket::local::asynchronous::Client;
    use rocket::serde::json::Value;

    #[rocket::async_test]
    async fn unknown_routes_get_json_errors() {
        let client = Client::tracked(build_rocket(test_config())).await.expect("valid rocket instance");

        let response = client.get("/nowhere").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
        let body: Value = response.into_json().await.unwrap();
        assert!(body["error"].is_string());
    }

    #[rocket::async_test]
    async fn ignite_fails_on_unreachable_database() {
        let mut config = test_config();
        config.database.url = "sqlite:///nonexistent-dir/shelfwise/library.db".to_string();

        assert!(Client::tracked(build_rocket(config)).await.is_err());
    }

    #[test]
    fn building_twice_does_not_panic() {
        let _ = build_rocket(test_config());
        let _ = build_rocket(test_config());
    }
}
