use chrono::{Duration, Utc};
use sqlx::{Pool, Sqlite, Transaction};
use tracing::{info, instrument, warn};

use super::{
    count_beck_analyses, count_craving_entries, count_patient_sessions, count_strategies, get_user,
};
use crate::error::AppError;
use crate::gamification::{
    Activity, ActivityCounts, Badge, POINTS_PER_LEVEL, earned_badges, level_for_points,
};
use crate::models::{BadgeView, Dashboard};

/// Adds the activity's points `times` over and re-derives the level inside
/// the caller's transaction, so the points land with the row that earned them.
/// Returns the new `(points, level)`.
#[instrument(skip(tx))]
pub async fn record_activity(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: i64,
    activity: Activity,
    times: i64,
) -> Result<(i64, i64), AppError> {
    let awarded = activity.points() * times;
    info!(awarded, "Recording activity");

    let points = sqlx::query_scalar::<_, i64>(
        "UPDATE users SET points = points + ? WHERE id = ? RETURNING points",
    )
    .bind(awarded)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User with id {} not found in database", user_id)))?;

    let level = level_for_points(points);
    sqlx::query("UPDATE users SET level = ? WHERE id = ?")
        .bind(level)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    Ok((points, level))
}

/// Runs after the activity's transaction has committed. Badges are derived
/// from counts, so a failed refresh is caught up by the next one.
pub async fn award_badges(pool: &Pool<Sqlite>, user_id: i64) {
    if let Err(err) = refresh_badges(pool, user_id).await {
        warn!(user_id, error = %err, "Failed to refresh badges");
    }
}

#[instrument(skip(pool))]
pub async fn get_activity_counts(
    pool: &Pool<Sqlite>,
    user_id: i64,
) -> Result<ActivityCounts, AppError> {
    let user = get_user(pool, user_id).await?;
    let sessions = count_patient_sessions(pool, user_id).await?;

    Ok(ActivityCounts {
        cravings: count_craving_entries(pool, user_id).await?,
        beck_analyses: count_beck_analyses(pool, user_id).await?,
        strategies: count_strategies(pool, user_id).await?,
        sessions_completed: sessions.done,
        level: user.level,
    })
}

/// Stores any badge the user now qualifies for and returns the ones that
/// were not held before.
#[instrument(skip(pool))]
pub async fn refresh_badges(pool: &Pool<Sqlite>, user_id: i64) -> Result<Vec<Badge>, AppError> {
    let counts = get_activity_counts(pool, user_id).await?;
    let mut awarded = Vec::new();

    for badge in earned_badges(&counts) {
        let res = sqlx::query(
            "INSERT OR IGNORE INTO user_badges (user_id, badge, awarded_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(badge.as_str())
        .bind(Utc::now().naive_utc())
        .execute(pool)
        .await?;

        if res.rows_affected() > 0 {
            info!(badge = badge.as_str(), "Badge awarded");
            awarded.push(badge);
        }
    }

    Ok(awarded)
}

#[instrument(skip(pool))]
pub async fn get_user_badges(pool: &Pool<Sqlite>, user_id: i64) -> Result<Vec<Badge>, AppError> {
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT badge FROM user_badges WHERE user_id = ? ORDER BY awarded_at, id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut badges = Vec::with_capacity(rows.len());
    for raw in rows {
        match raw.parse::<Badge>() {
            Ok(badge) => badges.push(badge),
            Err(err) => warn!(error = %err, "Skipping unknown badge"),
        }
    }
    Ok(badges)
}

#[instrument(skip(pool))]
pub async fn get_dashboard(pool: &Pool<Sqlite>, user_id: i64) -> Result<Dashboard, AppError> {
    info!("Building dashboard");
    let user = get_user(pool, user_id).await?;

    let since = (Utc::now() - Duration::days(7)).naive_utc();
    let average_craving_last_7_days = sqlx::query_scalar::<_, Option<f64>>(
        "SELECT AVG(intensity) FROM craving_entries WHERE user_id = ? AND created_at >= ?",
    )
    .bind(user_id)
    .bind(since)
    .fetch_one(pool)
    .await?;

    let badges = get_user_badges(pool, user_id).await?;

    Ok(Dashboard {
        user_id,
        points: user.points,
        level: user.level,
        points_to_next_level: POINTS_PER_LEVEL - user.points.max(0) % POINTS_PER_LEVEL,
        craving_entries: count_craving_entries(pool, user_id).await?,
        average_craving_last_7_days,
        beck_analyses: count_beck_analyses(pool, user_id).await?,
        strategies: count_strategies(pool, user_id).await?,
        sessions: count_patient_sessions(pool, user_id).await?,
        badges: badges.into_iter().map(BadgeView::from).collect(),
    })
}
