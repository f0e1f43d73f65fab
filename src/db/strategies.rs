use chrono::Utc;
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use super::{award_badges, record_activity};
use crate::error::AppError;
use crate::gamification::Activity;
use crate::models::{AntiCravingStrategy, DbAntiCravingStrategy, StrategyInput};

const STRATEGY_COLUMNS: &str = "id, user_id, context, exercise, effort, duration_minutes,
     craving_before, craving_after, created_at, updated_at";

/// Saves the whole batch, and its points, or nothing.
#[instrument(skip(pool, strategies), fields(count = strategies.len()))]
pub async fn create_strategies(
    pool: &Pool<Sqlite>,
    user_id: i64,
    strategies: &[StrategyInput],
) -> Result<Vec<AntiCravingStrategy>, AppError> {
    info!("Saving anti-craving strategies");
    let mut tx = pool.begin().await?;
    let mut ids = Vec::with_capacity(strategies.len());

    for strategy in strategies {
        let res = sqlx::query(
            "INSERT INTO anti_craving_strategies
             (user_id, context, exercise, effort, duration_minutes, craving_before, craving_after)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(strategy.context.as_str())
        .bind(&strategy.exercise)
        .bind(strategy.effort.as_str())
        .bind(strategy.duration_minutes)
        .bind(strategy.craving_before)
        .bind(strategy.craving_after)
        .execute(&mut *tx)
        .await?;
        ids.push(res.last_insert_rowid());
    }

    record_activity(&mut tx, user_id, Activity::StrategySaved, ids.len() as i64).await?;
    tx.commit().await?;

    award_badges(pool, user_id).await;

    let mut saved = Vec::with_capacity(ids.len());
    for id in ids {
        saved.push(get_strategy(pool, id).await?);
    }
    Ok(saved)
}

#[instrument(skip(pool))]
pub async fn get_strategy(pool: &Pool<Sqlite>, id: i64) -> Result<AntiCravingStrategy, AppError> {
    info!("Getting strategy");
    let row = sqlx::query_as::<_, DbAntiCravingStrategy>(&format!(
        "SELECT {STRATEGY_COLUMNS} FROM anti_craving_strategies WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(AntiCravingStrategy::from)
        .ok_or_else(|| AppError::NotFound(format!("Strategy {} not found", id)))
}

#[instrument(skip(pool))]
pub async fn get_strategies(
    pool: &Pool<Sqlite>,
    user_id: i64,
) -> Result<Vec<AntiCravingStrategy>, AppError> {
    info!("Getting strategies");
    let rows = sqlx::query_as::<_, DbAntiCravingStrategy>(&format!(
        "SELECT {STRATEGY_COLUMNS} FROM anti_craving_strategies
         WHERE user_id = ?
         ORDER BY updated_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(AntiCravingStrategy::from).collect())
}

#[instrument(skip(pool, strategy))]
pub async fn update_strategy(
    pool: &Pool<Sqlite>,
    id: i64,
    strategy: &StrategyInput,
) -> Result<AntiCravingStrategy, AppError> {
    info!("Updating strategy");
    let now = Utc::now().naive_utc();
    let res = sqlx::query(
        "UPDATE anti_craving_strategies
         SET context = ?, exercise = ?, effort = ?, duration_minutes = ?,
             craving_before = ?, craving_after = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(strategy.context.as_str())
    .bind(&strategy.exercise)
    .bind(strategy.effort.as_str())
    .bind(strategy.duration_minutes)
    .bind(strategy.craving_before)
    .bind(strategy.craving_after)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Strategy {} not found", id)));
    }
    get_strategy(pool, id).await
}

#[instrument(skip(pool))]
pub async fn delete_strategy(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting strategy");
    let res = sqlx::query("DELETE FROM anti_craving_strategies WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Strategy {} not found", id)));
    }
    Ok(())
}

#[instrument(skip(pool))]
pub async fn count_strategies(pool: &Pool<Sqlite>, user_id: i64) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM anti_craving_strategies WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}
