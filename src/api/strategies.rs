use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{Route, State};
use sqlx::{Pool, Sqlite};

use super::require_owner;
use crate::auth::{Permission, User};
use crate::db::{
    create_strategies, delete_strategy, get_strategies, get_strategy, update_strategy,
};
use crate::error::AppError;
use crate::models::{AntiCravingStrategy, SaveStrategiesRequest, StrategyInput};
use crate::validation::JsonValidateExt;

#[post("/strategies", data = "<request>")]
pub async fn api_save_strategies(
    request: Json<SaveStrategiesRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<Vec<AntiCravingStrategy>>>, AppError> {
    user.require_permission(Permission::LogOwnEntries)?;
    let request = request.validate_custom()?;

    let saved = create_strategies(db, user.id, &request.strategies).await?;
    Ok(Custom(Status::Created, Json(saved)))
}

#[get("/strategies")]
pub async fn api_get_strategies(
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<AntiCravingStrategy>>, AppError> {
    Ok(Json(get_strategies(db, user.id).await?))
}

#[put("/strategies/<id>", data = "<strategy>")]
pub async fn api_update_strategy(
    id: i64,
    strategy: Json<StrategyInput>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<AntiCravingStrategy>, AppError> {
    let strategy = strategy.validate_custom()?;

    let existing = get_strategy(db, id).await?;
    require_owner(&user, existing.user_id)?;

    Ok(Json(update_strategy(db, id, &strategy).await?))
}

#[delete("/strategies/<id>")]
pub async fn api_delete_strategy(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    let existing = get_strategy(db, id).await?;
    require_owner(&user, existing.user_id)?;

    delete_strategy(db, id).await?;
    Ok(Status::NoContent)
}

pub fn routes() -> Vec<Route> {
    routes![
        api_save_strategies,
        api_get_strategies,
        api_update_strategy,
        api_delete_strategy,
    ]
}
