use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{Route, State};
use sqlx::{Pool, Sqlite};

use super::require_owner;
use crate::auth::{Permission, User};
use crate::db::{
    create_craving_entry, delete_craving_entry, get_craving_entries, get_craving_entry,
    get_craving_stats,
};
use crate::error::AppError;
use crate::models::{CravingEntry, CravingStats, NewCravingEntry};
use crate::validation::JsonValidateExt;

const MAX_LABEL_LENGTH: usize = 100;
const DEFAULT_STATS_DAYS: i64 = 30;
const MAX_STATS_DAYS: i64 = 365;

/// Trims labels and drops blanks and repeats, keeping first-seen order.
pub fn normalize_labels(field: &str, labels: Vec<String>) -> Result<Vec<String>, AppError> {
    let mut normalized: Vec<String> = Vec::with_capacity(labels.len());

    for label in labels {
        let label = label.trim();
        if label.is_empty() {
            continue;
        }
        if label.chars().count() > MAX_LABEL_LENGTH {
            return Err(AppError::Validation(format!(
                "Each {} entry is limited to {} characters",
                field, MAX_LABEL_LENGTH
            )));
        }
        if !normalized.iter().any(|existing| existing == label) {
            normalized.push(label.to_string());
        }
    }

    Ok(normalized)
}

#[post("/cravings", data = "<entry>")]
pub async fn api_create_craving(
    entry: Json<NewCravingEntry>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<CravingEntry>>, AppError> {
    user.require_permission(Permission::LogOwnEntries)?;

    let mut entry = entry.validate_custom()?;
    entry.triggers = normalize_labels("trigger", entry.triggers)?;
    entry.emotions = normalize_labels("emotion", entry.emotions)?;

    let created = create_craving_entry(db, user.id, &entry).await?;
    Ok(Custom(Status::Created, Json(created)))
}

#[get("/cravings?<limit>")]
pub async fn api_get_cravings(
    limit: Option<i64>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<CravingEntry>>, AppError> {
    if limit.is_some_and(|limit| limit <= 0) {
        return Err(AppError::Validation(
            "Limit must be greater than zero".to_string(),
        ));
    }

    Ok(Json(get_craving_entries(db, user.id, limit).await?))
}

#[get("/cravings/stats?<days>")]
pub async fn api_get_craving_stats(
    days: Option<i64>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<CravingStats>, AppError> {
    user.require_permission(Permission::ViewOwnProgress)?;

    let days = days.unwrap_or(DEFAULT_STATS_DAYS);
    if !(1..=MAX_STATS_DAYS).contains(&days) {
        return Err(AppError::Validation(format!(
            "Days must be between 1 and {}",
            MAX_STATS_DAYS
        )));
    }

    Ok(Json(get_craving_stats(db, user.id, days).await?))
}

#[delete("/cravings/<id>")]
pub async fn api_delete_craving(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    let entry = get_craving_entry(db, id).await?;
    require_owner(&user, entry.user_id)?;

    delete_craving_entry(db, id).await?;
    Ok(Status::NoContent)
}

pub fn routes() -> Vec<Route> {
    routes![
        api_create_craving,
        api_get_cravings,
        api_get_craving_stats,
        api_delete_craving,
    ]
}
