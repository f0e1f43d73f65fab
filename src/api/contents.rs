use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{Route, State};
use sqlx::{Pool, Sqlite};

use super::parse_query;
use crate::auth::{Permission, User};
use crate::db::{
    create_educational_content, delete_educational_content, get_educational_content,
    get_educational_contents, update_educational_content,
};
use crate::error::AppError;
use crate::models::{ContentInput, EducationalContent};
use crate::validation::JsonValidateExt;

#[get("/educational-contents?<category>")]
pub async fn api_get_contents(
    category: Option<&str>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<EducationalContent>>, AppError> {
    user.require_permission(Permission::ViewContent)?;

    let contents = get_educational_contents(
        db,
        parse_query("category", category)?,
        user.has_permission(Permission::ManageContent),
    )
    .await?;

    Ok(Json(contents))
}

#[get("/educational-contents/<id>")]
pub async fn api_get_content(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<EducationalContent>, AppError> {
    user.require_permission(Permission::ViewContent)?;

    let content = get_educational_content(db, id).await?;
    if !content.is_published && !user.has_permission(Permission::ManageContent) {
        return Err(AppError::NotFound(format!(
            "Educational content {} not found",
            id
        )));
    }

    Ok(Json(content))
}

#[post("/educational-contents", data = "<content>")]
pub async fn api_create_content(
    content: Json<ContentInput>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<EducationalContent>>, AppError> {
    user.require_permission(Permission::ManageContent)?;
    let content = content.validate_custom()?;

    Ok(Custom(
        Status::Created,
        Json(create_educational_content(db, &content).await?),
    ))
}

#[put("/educational-contents/<id>", data = "<content>")]
pub async fn api_update_content(
    id: i64,
    content: Json<ContentInput>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<EducationalContent>, AppError> {
    user.require_permission(Permission::ManageContent)?;
    let content = content.validate_custom()?;

    Ok(Json(update_educational_content(db, id, &content).await?))
}

#[delete("/educational-contents/<id>")]
pub async fn api_delete_content(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    user.require_permission(Permission::ManageContent)?;

    delete_educational_content(db, id).await?;
    Ok(Status::NoContent)
}

pub fn routes() -> Vec<Route> {
    routes![
        api_get_contents,
        api_get_content,
        api_create_content,
        api_update_content,
        api_delete_content,
    ]
}
