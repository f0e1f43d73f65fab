use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{Route, State};
use sqlx::{Pool, Sqlite};

use super::require_owner;
use crate::auth::{Permission, User};
use crate::db::{
    create_beck_analysis, delete_beck_analysis, get_beck_analyses, get_beck_analysis,
};
use crate::error::AppError;
use crate::models::{BeckAnalysis, NewBeckAnalysis};
use crate::validation::JsonValidateExt;

#[post("/beck-analyses", data = "<analysis>")]
pub async fn api_create_beck_analysis(
    analysis: Json<NewBeckAnalysis>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<BeckAnalysis>>, AppError> {
    user.require_permission(Permission::LogOwnEntries)?;
    let analysis = analysis.validate_custom()?;

    let created = create_beck_analysis(db, user.id, &analysis).await?;
    Ok(Custom(Status::Created, Json(created)))
}

#[get("/beck-analyses")]
pub async fn api_get_beck_analyses(
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<BeckAnalysis>>, AppError> {
    Ok(Json(get_beck_analyses(db, user.id).await?))
}

/// Therapists may read any worksheet; patients only their own.
#[get("/beck-analyses/<id>")]
pub async fn api_get_beck_analysis(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<BeckAnalysis>, AppError> {
    let analysis = get_beck_analysis(db, id).await?;
    user.require_owner_or(analysis.user_id, Permission::ViewAllPatients)?;

    Ok(Json(analysis))
}

#[delete("/beck-analyses/<id>")]
pub async fn api_delete_beck_analysis(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    let analysis = get_beck_analysis(db, id).await?;
    require_owner(&user, analysis.user_id)?;

    delete_beck_analysis(db, id).await?;
    Ok(Status::NoContent)
}

pub fn routes() -> Vec<Route> {
    routes![
        api_create_beck_analysis,
        api_get_beck_analyses,
        api_get_beck_analysis,
        api_delete_beck_analysis,
    ]
}
