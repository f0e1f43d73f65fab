use rocket::Route;

use crate::auth::User;
use crate::error::AppError;

pub mod auth;
pub mod beck;
pub mod contents;
pub mod cravings;
pub mod dashboard;
pub mod exercises;
pub mod patient_sessions;
pub mod protocols;
pub mod sessions;
pub mod strategies;
pub mod timers;
pub mod users;

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}

/// Every route served under `/api`.
pub fn routes() -> Vec<Route> {
    let mut routes = routes![health];
    routes.extend(auth::routes());
    routes.extend(users::routes());
    routes.extend(cravings::routes());
    routes.extend(beck::routes());
    routes.extend(strategies::routes());
    routes.extend(exercises::routes());
    routes.extend(contents::routes());
    routes.extend(protocols::routes());
    routes.extend(sessions::routes());
    routes.extend(timers::routes());
    routes.extend(patient_sessions::routes());
    routes.extend(dashboard::routes());
    routes
}

/// Patient-owned rows are only reachable by their owner.
pub(crate) fn require_owner(user: &User, owner_id: i64) -> Result<(), AppError> {
    if user.id == owner_id {
        Ok(())
    } else {
        tracing::warn!(user_id = user.id, owner_id, "Access to another user's record denied");
        Err(AppError::Authorization(
            "You can only access your own records".to_string(),
        ))
    }
}

/// Parses an optional query value into one of the text enums.
pub(crate) fn parse_query<T>(field: &str, value: Option<&str>) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr<Err = anyhow::Error>,
{
    value
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|err| AppError::Validation(format!("Invalid {}: {}", field, err)))
        })
        .transpose()
}
