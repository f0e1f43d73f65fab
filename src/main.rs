#[macro_use]
extern crate rocket;

mod api;
mod auth;
mod db;
mod env;
mod error;
mod gamification;
mod models;
mod protocol;
mod telemetry;
#[cfg(test)]
mod test;
mod timer;
mod validation;

use std::str::FromStr;
use std::time::Duration;

use db::{clean_expired_sessions, ensure_admin};
use env::{AppConfig, ConfigError, load_environment};
use error::AppError;
use rocket::{Build, Rocket, tokio};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use telemetry::{TelemetryFairing, init_tracing};
use thiserror::Error;
use timer::LiveTimers;
use tracing::{error, info};
use validation::default_catcher;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("{0}")]
    Rocket(Box<rocket::Error>),
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

impl From<rocket::Error> for Error {
    fn from(value: rocket::Error) -> Self {
        Error::Rocket(Box::new(value))
    }
}

#[rocket::main]
async fn main() -> Result<(), Error> {
    let env_result = load_environment();
    let _telemetry = init_tracing();
    env_result?;

    let config = AppConfig::from_env()?;

    let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations completed successfully");

    if let Some(admin) = &config.bootstrap_admin {
        ensure_admin(&pool, &admin.email, &admin.password).await?;
    }

    spawn_session_cleanup(pool.clone(), config.session_cleanup_interval_secs);

    let _rocket = init_rocket(pool, config).await.launch().await?;
    Ok(())
}

fn spawn_session_cleanup(pool: SqlitePool, interval_secs: u64) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;

        loop {
            match clean_expired_sessions(&pool).await {
                Ok(count) => {
                    if count > 0 {
                        info!("Cleaned up {} expired sessions", count);
                    }
                }
                Err(e) => {
                    error!("Failed to clean expired sessions: {}", e);
                }
            }

            tokio::time::sleep(Duration::from_secs(interval_secs)).await;
        }
    });
}

pub async fn init_rocket(pool: SqlitePool, config: AppConfig) -> Rocket<Build> {
    info!("Starting craving companion");

    rocket::build()
        .manage(pool)
        .manage(config)
        .manage(LiveTimers::default())
        .mount("/api", api::routes())
        .register("/", catchers![default_catcher])
        .attach(TelemetryFairing)
}
