use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{Route, State};
use sqlx::{Pool, Sqlite};

use super::{parse_query, require_owner};
use crate::auth::{Permission, User};
use crate::db::{
    assign_session, complete_patient_session, get_patient_session, get_patient_sessions,
    skip_patient_session,
};
use crate::error::AppError;
use crate::models::{AssignSessionRequest, CompleteSessionRequest, PatientSession};
use crate::validation::JsonValidateExt;

#[post("/patient-sessions", data = "<request>")]
pub async fn api_assign_session(
    request: Json<AssignSessionRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<PatientSession>>, AppError> {
    user.require_permission(Permission::AssignSessions)?;
    let request = request.validate_custom()?;

    let assigned = assign_session(db, user.id, &request).await?;
    Ok(Custom(Status::Created, Json(assigned)))
}

/// Patients see their own assignments; therapists pick a patient.
#[get("/patient-sessions?<patient_id>&<status>")]
pub async fn api_get_patient_sessions(
    patient_id: Option<i64>,
    status: Option<&str>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<PatientSession>>, AppError> {
    let patient_id = patient_id.unwrap_or(user.id);
    user.require_owner_or(patient_id, Permission::ViewAllPatients)?;

    let sessions = get_patient_sessions(db, patient_id, parse_query("status", status)?).await?;
    Ok(Json(sessions))
}

#[post("/patient-sessions/<id>/complete", data = "<completion>")]
pub async fn api_complete_session(
    id: i64,
    completion: Json<CompleteSessionRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<PatientSession>, AppError> {
    user.require_permission(Permission::CompleteOwnSessions)?;
    let completion = completion.validate_custom()?;

    let assignment = get_patient_session(db, id).await?;
    require_owner(&user, assignment.patient_id)?;

    Ok(Json(complete_patient_session(db, id, &completion).await?))
}

#[post("/patient-sessions/<id>/skip")]
pub async fn api_skip_session(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<PatientSession>, AppError> {
    user.require_permission(Permission::CompleteOwnSessions)?;

    let assignment = get_patient_session(db, id).await?;
    require_owner(&user, assignment.patient_id)?;

    Ok(Json(skip_patient_session(db, id).await?))
}

pub fn routes() -> Vec<Route> {
    routes![
        api_assign_session,
        api_get_patient_sessions,
        api_complete_session,
        api_skip_session,
    ]
}
