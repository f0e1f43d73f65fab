use chrono::{Duration, NaiveDate, Utc};
use sqlx::{Pool, Sqlite};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, instrument};

use super::{award_badges, record_activity};
use crate::error::AppError;
use crate::gamification::Activity;
use crate::models::{
    CravingEntry, CravingStats, DailyIntensity, DbCravingEntry, LabelCount, NewCravingEntry,
};

const CRAVING_COLUMNS: &str = "id, user_id, intensity, triggers, emotions, notes, created_at";
const TOP_LABELS: usize = 5;

#[instrument(skip(pool, entry))]
pub async fn create_craving_entry(
    pool: &Pool<Sqlite>,
    user_id: i64,
    entry: &NewCravingEntry,
) -> Result<CravingEntry, AppError> {
    info!(intensity = entry.intensity, "Creating craving entry");
    let mut tx = pool.begin().await?;

    let res = sqlx::query(
        "INSERT INTO craving_entries (user_id, intensity, triggers, emotions, notes)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(entry.intensity)
    .bind(serde_json::to_string(&entry.triggers)?)
    .bind(serde_json::to_string(&entry.emotions)?)
    .bind(&entry.notes)
    .execute(&mut *tx)
    .await?;

    record_activity(&mut tx, user_id, Activity::CravingLogged, 1).await?;
    tx.commit().await?;

    award_badges(pool, user_id).await;
    get_craving_entry(pool, res.last_insert_rowid()).await
}

#[instrument(skip(pool))]
pub async fn get_craving_entry(pool: &Pool<Sqlite>, id: i64) -> Result<CravingEntry, AppError> {
    info!("Getting craving entry");
    let row = sqlx::query_as::<_, DbCravingEntry>(&format!(
        "SELECT {CRAVING_COLUMNS} FROM craving_entries WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(CravingEntry::from)
        .ok_or_else(|| AppError::NotFound(format!("Craving entry {} not found", id)))
}

/// Newest first. `limit` of `None` returns everything.
#[instrument(skip(pool))]
pub async fn get_craving_entries(
    pool: &Pool<Sqlite>,
    user_id: i64,
    limit: Option<i64>,
) -> Result<Vec<CravingEntry>, AppError> {
    info!("Getting craving entries");
    let rows = sqlx::query_as::<_, DbCravingEntry>(&format!(
        "SELECT {CRAVING_COLUMNS} FROM craving_entries
         WHERE user_id = ?
         ORDER BY created_at DESC, id DESC
         LIMIT ?"
    ))
    .bind(user_id)
    .bind(limit.unwrap_or(-1))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(CravingEntry::from).collect())
}

#[instrument(skip(pool))]
pub async fn delete_craving_entry(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting craving entry");
    let res = sqlx::query("DELETE FROM craving_entries WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Craving entry {} not found", id)));
    }
    Ok(())
}

#[instrument(skip(pool))]
pub async fn count_craving_entries(pool: &Pool<Sqlite>, user_id: i64) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM craving_entries WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[instrument(skip(pool))]
pub async fn get_craving_stats(
    pool: &Pool<Sqlite>,
    user_id: i64,
    days: i64,
) -> Result<CravingStats, AppError> {
    info!("Computing craving statistics");
    let since = (Utc::now() - Duration::days(days)).naive_utc();

    let rows = sqlx::query_as::<_, DbCravingEntry>(&format!(
        "SELECT {CRAVING_COLUMNS} FROM craving_entries
         WHERE user_id = ? AND created_at >= ?
         ORDER BY created_at"
    ))
    .bind(user_id)
    .bind(since)
    .fetch_all(pool)
    .await?;

    let entries: Vec<CravingEntry> = rows.into_iter().map(CravingEntry::from).collect();
    Ok(summarize_cravings(&entries, days))
}

pub fn summarize_cravings(entries: &[CravingEntry], days: i64) -> CravingStats {
    let total_entries = entries.len() as i64;
    let average_intensity = if entries.is_empty() {
        None
    } else {
        Some(entries.iter().map(|e| e.intensity).sum::<i64>() as f64 / total_entries as f64)
    };

    let mut by_day: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
    for entry in entries {
        let slot = by_day.entry(entry.created_at.date_naive()).or_default();
        slot.0 += entry.intensity;
        slot.1 += 1;
    }

    CravingStats {
        days,
        total_entries,
        average_intensity,
        min_intensity: entries.iter().map(|e| e.intensity).min(),
        max_intensity: entries.iter().map(|e| e.intensity).max(),
        top_triggers: top_labels(entries.iter().flat_map(|e| e.triggers.iter())),
        top_emotions: top_labels(entries.iter().flat_map(|e| e.emotions.iter())),
        daily: by_day
            .into_iter()
            .map(|(day, (sum, count))| DailyIntensity {
                day,
                average_intensity: sum as f64 / count as f64,
                entries: count,
            })
            .collect(),
    }
}

fn top_labels<'a>(labels: impl Iterator<Item = &'a String>) -> Vec<LabelCount> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for label in labels {
        *counts.entry(label.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    ranked.truncate(TOP_LABELS);
    ranked
}
