use sqlx::{Pool, Sqlite, Transaction};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{
    DbExerciseSession, DbSessionExercise, ExerciseSession, SessionExercise, SessionInput,
};
use crate::protocol::ProtocolSummary;

const SESSION_COLUMNS: &str = "id, title, description, category, protocol_config, total_seconds,
     work_seconds, rest_seconds, intensity_percent, created_by, created_at";

async fn insert_session_exercises(
    tx: &mut Transaction<'_, Sqlite>,
    session_id: i64,
    exercise_ids: &[i64],
) -> Result<(), AppError> {
    for (position, exercise_id) in exercise_ids.iter().enumerate() {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM exercises WHERE id = ?")
            .bind(exercise_id)
            .fetch_one(&mut **tx)
            .await?;

        if exists == 0 {
            return Err(AppError::Validation(format!(
                "Exercise {} does not exist",
                exercise_id
            )));
        }

        sqlx::query(
            "INSERT INTO session_exercises (session_id, exercise_id, position) VALUES (?, ?, ?)",
        )
        .bind(session_id)
        .bind(exercise_id)
        .bind(position as i64)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[instrument(skip(pool, session, summary), fields(title = %session.title, protocol = %summary.protocol))]
pub async fn create_exercise_session(
    pool: &Pool<Sqlite>,
    created_by: i64,
    session: &SessionInput,
    summary: &ProtocolSummary,
) -> Result<ExerciseSession, AppError> {
    info!("Creating exercise session");
    let mut tx = pool.begin().await?;

    let res = sqlx::query(
        "INSERT INTO exercise_sessions
         (title, description, category, protocol, protocol_config, total_seconds,
          work_seconds, rest_seconds, intensity_percent, created_by)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&session.title)
    .bind(&session.description)
    .bind(session.category.as_str())
    .bind(summary.protocol.as_str())
    .bind(serde_json::to_string(&session.protocol)?)
    .bind(i64::from(summary.total_seconds))
    .bind(i64::from(summary.work_seconds))
    .bind(i64::from(summary.rest_seconds))
    .bind(i64::from(summary.intensity_percent))
    .bind(created_by)
    .execute(&mut *tx)
    .await?;

    let session_id = res.last_insert_rowid();
    insert_session_exercises(&mut tx, session_id, &session.exercise_ids).await?;

    tx.commit().await?;

    get_exercise_session(pool, session_id).await
}

#[instrument(skip(pool, session, summary))]
pub async fn update_exercise_session(
    pool: &Pool<Sqlite>,
    id: i64,
    session: &SessionInput,
    summary: &ProtocolSummary,
) -> Result<ExerciseSession, AppError> {
    info!("Updating exercise session");
    let mut tx = pool.begin().await?;

    let res = sqlx::query(
        "UPDATE exercise_sessions
         SET title = ?, description = ?, category = ?, protocol = ?, protocol_config = ?,
             total_seconds = ?, work_seconds = ?, rest_seconds = ?, intensity_percent = ?
         WHERE id = ?",
    )
    .bind(&session.title)
    .bind(&session.description)
    .bind(session.category.as_str())
    .bind(summary.protocol.as_str())
    .bind(serde_json::to_string(&session.protocol)?)
    .bind(i64::from(summary.total_seconds))
    .bind(i64::from(summary.work_seconds))
    .bind(i64::from(summary.rest_seconds))
    .bind(i64::from(summary.intensity_percent))
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Exercise session {} not found", id)));
    }

    sqlx::query("DELETE FROM session_exercises WHERE session_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    insert_session_exercises(&mut tx, id, &session.exercise_ids).await?;

    tx.commit().await?;

    get_exercise_session(pool, id).await
}

#[instrument(skip(pool))]
pub async fn get_session_exercises(
    pool: &Pool<Sqlite>,
    session_id: i64,
) -> Result<Vec<SessionExercise>, AppError> {
    let rows = sqlx::query_as::<_, DbSessionExercise>(
        "SELECT se.exercise_id, se.position, e.title, e.duration_minutes
         FROM session_exercises se
         JOIN exercises e ON e.id = se.exercise_id
         WHERE se.session_id = ?
         ORDER BY se.position",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(SessionExercise::from).collect())
}

#[instrument(skip(pool))]
pub async fn get_exercise_session(
    pool: &Pool<Sqlite>,
    id: i64,
) -> Result<ExerciseSession, AppError> {
    info!("Getting exercise session");
    let row = sqlx::query_as::<_, DbExerciseSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM exercise_sessions WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let mut session = match row {
        Some(row) => ExerciseSession::try_from(row)?,
        None => {
            return Err(AppError::NotFound(format!(
                "Exercise session {} not found",
                id
            )));
        }
    };

    session.exercises = get_session_exercises(pool, id).await?;
    Ok(session)
}

/// Lists sessions without their exercise lists.
#[instrument(skip(pool))]
pub async fn get_exercise_sessions(pool: &Pool<Sqlite>) -> Result<Vec<ExerciseSession>, AppError> {
    info!("Getting exercise sessions");
    let rows = sqlx::query_as::<_, DbExerciseSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM exercise_sessions ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ExerciseSession::try_from).collect()
}

#[instrument(skip(pool))]
pub async fn delete_exercise_session(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting exercise session");
    let res = sqlx::query("DELETE FROM exercise_sessions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Exercise session {} not found", id)));
    }
    Ok(())
}
