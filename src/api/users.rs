use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::Deserialize;
use sqlx::{Pool, Sqlite};
use validator::Validate;

use super::parse_query;
use crate::auth::{Permission, Role, User};
use crate::db::{
    create_user, delete_user, get_all_users, get_user, get_users_by_role,
    invalidate_user_sessions, set_user_active, update_user_profile, update_user_role,
};
use crate::error::AppError;
use crate::validation::JsonValidateExt;

#[derive(Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "A valid email address is required"))]
    email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters"))]
    password: String,
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    first_name: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    last_name: String,
    role: Role,
}

#[derive(Deserialize, Validate)]
pub struct UpdateUserRequest {
    role: Option<Role>,
    is_active: Option<bool>,
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    first_name: Option<String>,
    #[validate(length(max = 100))]
    last_name: Option<String>,
}

#[get("/admin/users?<role>")]
pub async fn api_get_users(
    role: Option<&str>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<User>>, AppError> {
    user.require_permission(Permission::ManageUsers)?;

    let users = match parse_query::<Role>("role", role)? {
        Some(role) => get_users_by_role(db, role).await?,
        None => get_all_users(db).await?,
    };

    Ok(Json(users))
}

#[post("/admin/users", data = "<request>")]
pub async fn api_create_user(
    request: Json<CreateUserRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<User>>, AppError> {
    user.require_permission(Permission::ManageUsers)?;
    let request = request.validate_custom()?;

    let id = create_user(
        db,
        &request.email,
        &request.password,
        request.first_name.trim(),
        request.last_name.trim(),
        request.role,
    )
    .await?;

    Ok(Custom(Status::Created, Json(get_user(db, id).await?)))
}

#[put("/admin/users/<id>", data = "<request>")]
pub async fn api_update_user(
    id: i64,
    request: Json<UpdateUserRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<User>, AppError> {
    user.require_permission(Permission::ManageUsers)?;
    let request = request.validate_custom()?;

    let target = get_user(db, id).await?;

    if target.id == user.id
        && (request.is_active == Some(false) || request.role.is_some_and(|r| r != Role::Admin))
    {
        return Err(AppError::Validation(
            "You cannot deactivate or demote your own account".to_string(),
        ));
    }

    if let Some(role) = request.role {
        update_user_role(db, id, role).await?;
    }

    if request.first_name.is_some() || request.last_name.is_some() {
        let first_name = request.first_name.unwrap_or(target.first_name);
        let last_name = request.last_name.unwrap_or(target.last_name);
        update_user_profile(db, id, first_name.trim(), last_name.trim()).await?;
    }

    if let Some(active) = request.is_active {
        set_user_active(db, id, active).await?;
        if !active {
            invalidate_user_sessions(db, id).await?;
        }
    }

    Ok(Json(get_user(db, id).await?))
}

#[delete("/admin/users/<id>")]
pub async fn api_delete_user(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    user.require_permission(Permission::ManageUsers)?;

    if id == user.id {
        return Err(AppError::Validation(
            "You cannot delete your own account".to_string(),
        ));
    }

    delete_user(db, id).await?;
    Ok(Status::NoContent)
}

pub fn routes() -> Vec<Route> {
    routes![api_get_users, api_create_user, api_update_user, api_delete_user]
}
