use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::Serialize;
use sqlx::{Pool, Sqlite};

use crate::auth::{Permission, User};
use crate::db::{
    create_exercise_session, delete_exercise_session, get_exercise_session,
    get_exercise_sessions, update_exercise_session,
};
use crate::error::AppError;
use crate::models::{ExerciseSession, SessionInput};
use crate::timer::{TimelineEntry, timeline};
use crate::validation::JsonValidateExt;

#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    pub session_id: i64,
    pub total_seconds: i64,
    pub entries: Vec<TimelineEntry>,
}

#[get("/sessions")]
pub async fn api_get_sessions(
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<ExerciseSession>>, AppError> {
    user.require_permission(Permission::ViewContent)?;
    Ok(Json(get_exercise_sessions(db).await?))
}

#[get("/sessions/<id>")]
pub async fn api_get_session(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ExerciseSession>, AppError> {
    user.require_permission(Permission::ViewContent)?;
    Ok(Json(get_exercise_session(db, id).await?))
}

#[get("/sessions/<id>/timeline")]
pub async fn api_get_session_timeline(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<TimelineResponse>, AppError> {
    user.require_permission(Permission::ViewContent)?;

    let session = get_exercise_session(db, id).await?;
    let entries = timeline(session.protocol_config.phases()?);

    Ok(Json(TimelineResponse {
        session_id: session.id,
        total_seconds: session.total_seconds,
        entries,
    }))
}

#[post("/sessions", data = "<session>")]
pub async fn api_create_session(
    session: Json<SessionInput>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<ExerciseSession>>, AppError> {
    user.require_permission(Permission::ManageSessions)?;
    let session = session.validate_custom()?;
    let summary = session.protocol.summary()?;

    let created = create_exercise_session(db, user.id, &session, &summary).await?;
    Ok(Custom(Status::Created, Json(created)))
}

#[put("/sessions/<id>", data = "<session>")]
pub async fn api_update_session(
    id: i64,
    session: Json<SessionInput>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ExerciseSession>, AppError> {
    user.require_permission(Permission::ManageSessions)?;
    let session = session.validate_custom()?;
    let summary = session.protocol.summary()?;

    Ok(Json(update_exercise_session(db, id, &session, &summary).await?))
}

#[delete("/sessions/<id>")]
pub async fn api_delete_session(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    user.require_permission(Permission::ManageSessions)?;

    delete_exercise_session(db, id).await?;
    Ok(Status::NoContent)
}

pub fn routes() -> Vec<Route> {
    routes![
        api_get_sessions,
        api_get_session,
        api_get_session_timeline,
        api_create_session,
        api_update_session,
        api_delete_session,
    ]
}
