use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{Route, State};
use sqlx::{Pool, Sqlite};

use crate::auth::{Permission, User};
use crate::db::get_exercise_session;
use crate::error::AppError;
use crate::timer::{LiveTimerStatus, LiveTimers};

fn no_timer() -> AppError {
    AppError::NotFound("No session timer is running".to_string())
}

/// Starts counting down a session's phases on the server. A user has one
/// live timer; starting another replaces it.
#[post("/sessions/<id>/timer")]
pub async fn api_start_timer(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
    timers: &State<LiveTimers>,
) -> Result<Custom<Json<LiveTimerStatus>>, AppError> {
    user.require_permission(Permission::ViewContent)?;

    let session = get_exercise_session(db, id).await?;
    let phases = session.protocol_config.phases()?;

    let status = timers.start(user.id, session.id, phases).await;
    Ok(Custom(Status::Created, Json(status)))
}

#[get("/timer")]
pub async fn api_get_timer(
    user: User,
    timers: &State<LiveTimers>,
) -> Result<Json<LiveTimerStatus>, AppError> {
    timers.status(user.id).await.map(Json).ok_or_else(no_timer)
}

#[post("/timer/pause")]
pub async fn api_pause_timer(
    user: User,
    timers: &State<LiveTimers>,
) -> Result<Json<LiveTimerStatus>, AppError> {
    timers.pause(user.id).await.map(Json).ok_or_else(no_timer)
}

#[post("/timer/resume")]
pub async fn api_resume_timer(
    user: User,
    timers: &State<LiveTimers>,
) -> Result<Json<LiveTimerStatus>, AppError> {
    timers.resume(user.id).await.map(Json).ok_or_else(no_timer)
}

#[post("/timer/restart")]
pub async fn api_restart_timer(
    user: User,
    timers: &State<LiveTimers>,
) -> Result<Json<LiveTimerStatus>, AppError> {
    timers.restart(user.id).await.map(Json).ok_or_else(no_timer)
}

#[delete("/timer")]
pub async fn api_stop_timer(user: User, timers: &State<LiveTimers>) -> Result<Status, AppError> {
    if timers.stop(user.id).await {
        Ok(Status::NoContent)
    } else {
        Err(no_timer())
    }
}

pub fn routes() -> Vec<Route> {
    routes![
        api_start_timer,
        api_get_timer,
        api_pause_timer,
        api_resume_timer,
        api_restart_timer,
        api_stop_timer,
    ]
}
