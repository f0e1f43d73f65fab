use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{Route, State};
use sqlx::{Pool, Sqlite};

use super::parse_query;
use crate::auth::{Permission, User};
use crate::db::{
    ExerciseFilter, create_exercise, delete_exercise, get_exercise, get_exercises,
    update_exercise,
};
use crate::error::AppError;
use crate::models::{Exercise, ExerciseInput};
use crate::validation::JsonValidateExt;

/// Inactive exercises are only listed for therapists who ask for them.
#[get("/exercises?<category>&<difficulty>&<include_inactive>")]
pub async fn api_get_exercises(
    category: Option<&str>,
    difficulty: Option<&str>,
    include_inactive: Option<bool>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Exercise>>, AppError> {
    user.require_permission(Permission::ViewContent)?;

    let filter = ExerciseFilter {
        category: parse_query("category", category)?,
        difficulty: parse_query("difficulty", difficulty)?,
        include_inactive: include_inactive.unwrap_or(false)
            && user.has_permission(Permission::ManageExercises),
    };

    Ok(Json(get_exercises(db, filter).await?))
}

#[get("/exercises/<id>")]
pub async fn api_get_exercise(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Exercise>, AppError> {
    user.require_permission(Permission::ViewContent)?;

    let exercise = get_exercise(db, id).await?;
    if !exercise.is_active && !user.has_permission(Permission::ManageExercises) {
        return Err(AppError::NotFound(format!("Exercise {} not found", id)));
    }

    Ok(Json(exercise))
}

#[post("/exercises", data = "<exercise>")]
pub async fn api_create_exercise(
    exercise: Json<ExerciseInput>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<Exercise>>, AppError> {
    user.require_permission(Permission::ManageExercises)?;
    let exercise = exercise.validate_custom()?;

    Ok(Custom(
        Status::Created,
        Json(create_exercise(db, &exercise).await?),
    ))
}

#[put("/exercises/<id>", data = "<exercise>")]
pub async fn api_update_exercise(
    id: i64,
    exercise: Json<ExerciseInput>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Exercise>, AppError> {
    user.require_permission(Permission::ManageExercises)?;
    let exercise = exercise.validate_custom()?;

    Ok(Json(update_exercise(db, id, &exercise).await?))
}

#[delete("/exercises/<id>")]
pub async fn api_delete_exercise(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    user.require_permission(Permission::ManageExercises)?;

    delete_exercise(db, id).await?;
    Ok(Status::NoContent)
}

pub fn routes() -> Vec<Route> {
    routes![
        api_get_exercises,
        api_get_exercise,
        api_create_exercise,
        api_update_exercise,
        api_delete_exercise,
    ]
}
