use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use super::{award_badges, record_activity};
use crate::error::AppError;
use crate::gamification::Activity;
use crate::models::{BeckAnalysis, DbBeckAnalysis, NewBeckAnalysis};

const BECK_COLUMNS: &str = "id, user_id, situation, automatic_thoughts, emotions, emotion_intensity,
     rational_response, new_feeling, new_intensity, created_at";

#[instrument(skip(pool, analysis))]
pub async fn create_beck_analysis(
    pool: &Pool<Sqlite>,
    user_id: i64,
    analysis: &NewBeckAnalysis,
) -> Result<BeckAnalysis, AppError> {
    info!("Creating Beck analysis");
    let mut tx = pool.begin().await?;

    let res = sqlx::query(
        "INSERT INTO beck_analyses
         (user_id, situation, automatic_thoughts, emotions, emotion_intensity,
          rational_response, new_feeling, new_intensity)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(&analysis.situation)
    .bind(&analysis.automatic_thoughts)
    .bind(&analysis.emotions)
    .bind(analysis.emotion_intensity)
    .bind(&analysis.rational_response)
    .bind(&analysis.new_feeling)
    .bind(analysis.new_intensity)
    .execute(&mut *tx)
    .await?;

    record_activity(&mut tx, user_id, Activity::BeckAnalysisCompleted, 1).await?;
    tx.commit().await?;

    award_badges(pool, user_id).await;
    get_beck_analysis(pool, res.last_insert_rowid()).await
}

#[instrument(skip(pool))]
pub async fn get_beck_analysis(pool: &Pool<Sqlite>, id: i64) -> Result<BeckAnalysis, AppError> {
    info!("Getting Beck analysis");
    let row = sqlx::query_as::<_, DbBeckAnalysis>(&format!(
        "SELECT {BECK_COLUMNS} FROM beck_analyses WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(BeckAnalysis::from)
        .ok_or_else(|| AppError::NotFound(format!("Beck analysis {} not found", id)))
}

#[instrument(skip(pool))]
pub async fn get_beck_analyses(
    pool: &Pool<Sqlite>,
    user_id: i64,
) -> Result<Vec<BeckAnalysis>, AppError> {
    info!("Getting Beck analyses");
    let rows = sqlx::query_as::<_, DbBeckAnalysis>(&format!(
        "SELECT {BECK_COLUMNS} FROM beck_analyses
         WHERE user_id = ?
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(BeckAnalysis::from).collect())
}

#[instrument(skip(pool))]
pub async fn delete_beck_analysis(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting Beck analysis");
    let res = sqlx::query("DELETE FROM beck_analyses WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Beck analysis {} not found", id)));
    }
    Ok(())
}

#[instrument(skip(pool))]
pub async fn count_beck_analyses(pool: &Pool<Sqlite>, user_id: i64) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM beck_analyses WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
