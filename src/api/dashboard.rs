use rocket::serde::json::Json;
use rocket::{Route, State};
use sqlx::{Pool, Sqlite};

use crate::auth::{Permission, Role, User};
use crate::db::{get_dashboard, get_user};
use crate::error::AppError;
use crate::models::Dashboard;

#[get("/dashboard")]
pub async fn api_get_dashboard(
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Dashboard>, AppError> {
    user.require_permission(Permission::ViewOwnProgress)?;
    Ok(Json(get_dashboard(db, user.id).await?))
}

#[get("/admin/patients/<id>/dashboard")]
pub async fn api_get_patient_dashboard(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Dashboard>, AppError> {
    user.require_permission(Permission::ViewAllPatients)?;

    let patient = get_user(db, id).await?;
    if patient.role != Role::Patient {
        return Err(AppError::NotFound(format!("Patient {} not found", id)));
    }

    Ok(Json(get_dashboard(db, id).await?))
}

pub fn routes() -> Vec<Route> {
    routes![api_get_dashboard, api_get_patient_dashboard]
}
