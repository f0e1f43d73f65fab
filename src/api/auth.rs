use chrono::{Duration, Utc};
use rocket::http::{CookieJar, Status};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::Deserialize;
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::auth::{Permission, Role, User, UserSession, clear_session_cookie, set_session_cookie};
use crate::db::{
    authenticate_user, create_user, create_user_session, get_user, invalidate_session,
    invalidate_user_sessions, update_user_password, update_user_profile,
};
use crate::env::AppConfig;
use crate::error::AppError;
use crate::validation::JsonValidateExt;

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "A valid email address is required"))]
    email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters"))]
    password: String,
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    last_name: String,
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Deserialize, Validate)]
pub struct ProfileRequest {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    last_name: String,
}

#[derive(Deserialize, Validate)]
pub struct ChangePasswordRequest {
    current_password: String,
    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters"))]
    new_password: String,
}

/// Stores a fresh session row and hands its token to the client.
pub(crate) async fn open_session(
    db: &Pool<Sqlite>,
    cookies: &CookieJar<'_>,
    config: &AppConfig,
    user_id: i64,
) -> Result<(), AppError> {
    let token = UserSession::generate_token();
    let expires_at = (Utc::now() + Duration::hours(config.session_ttl_hours)).naive_utc();

    create_user_session(db, user_id, &token, expires_at).await?;
    set_session_cookie(cookies, token, config.session_ttl_hours);
    Ok(())
}

#[post("/auth/register", data = "<request>")]
pub async fn api_register(
    request: Json<RegisterRequest>,
    cookies: &CookieJar<'_>,
    db: &State<Pool<Sqlite>>,
    config: &State<AppConfig>,
) -> Result<Custom<Json<User>>, AppError> {
    let request = request.validate_custom()?;

    let user_id = create_user(
        db,
        &request.email,
        &request.password,
        request.first_name.trim(),
        request.last_name.trim(),
        Role::Patient,
    )
    .await?;

    open_session(db, cookies, config, user_id).await?;

    let user = get_user(db, user_id).await?;
    tracing::info!(user_id, "Patient registered");
    Ok(Custom(Status::Created, Json(user)))
}

#[post("/auth/login", data = "<login>")]
pub async fn api_login(
    login: Json<LoginRequest>,
    cookies: &CookieJar<'_>,
    db: &State<Pool<Sqlite>>,
    config: &State<AppConfig>,
) -> Result<Json<User>, AppError> {
    let login = login.validate_custom()?;

    let user = authenticate_user(db, &login.email, &login.password)
        .await?
        .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

    open_session(db, cookies, config, user.id).await?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(user))
}

#[post("/auth/logout")]
pub async fn api_logout(cookies: &CookieJar<'_>, db: &State<Pool<Sqlite>>) -> Status {
    if let Some(token) = clear_session_cookie(cookies) {
        if let Err(err) = invalidate_session(db, &token).await {
            tracing::warn!(error = %err, "Failed to invalidate session on logout");
        }
    }

    Status::NoContent
}

#[get("/auth/me")]
pub async fn api_me(user: User) -> Result<Json<User>, AppError> {
    user.require_permission(Permission::ViewOwnProfile)?;
    Ok(Json(user))
}

#[put("/auth/profile", data = "<profile>")]
pub async fn api_update_profile(
    profile: Json<ProfileRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<User>, AppError> {
    user.require_permission(Permission::EditOwnProfile)?;
    let profile = profile.validate_custom()?;

    update_user_profile(
        db,
        user.id,
        profile.first_name.trim(),
        profile.last_name.trim(),
    )
    .await?;

    Ok(Json(get_user(db, user.id).await?))
}

/// Changing the password signs out every other device.
#[post("/auth/change-password", data = "<request>")]
pub async fn api_change_password(
    request: Json<ChangePasswordRequest>,
    user: User,
    cookies: &CookieJar<'_>,
    db: &State<Pool<Sqlite>>,
    config: &State<AppConfig>,
) -> Result<Status, AppError> {
    let request = request.validate_custom()?;

    if authenticate_user(db, &user.email, &request.current_password)
        .await?
        .is_none()
    {
        return Err(AppError::Validation(
            "Current password is incorrect".to_string(),
        ));
    }

    update_user_password(db, user.id, &request.new_password).await?;

    let revoked = invalidate_user_sessions(db, user.id).await?;
    tracing::info!(user_id = user.id, revoked, "Password changed, sessions revoked");

    open_session(db, cookies, config, user.id).await?;
    Ok(Status::NoContent)
}

pub fn routes() -> Vec<Route> {
    routes![
        api_register,
        api_login,
        api_logout,
        api_me,
        api_update_profile,
        api_change_password,
    ]
}
