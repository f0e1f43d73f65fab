use chrono::Utc;
use sqlx::{Pool, QueryBuilder, Sqlite};
use tracing::{info, instrument, warn};

use super::{award_badges, get_exercise_session, get_user, record_activity};
use crate::auth::Role;
use crate::error::AppError;
use crate::gamification::Activity;
use crate::models::{
    AssignSessionRequest, CompleteSessionRequest, DbPatientSession, PatientSession,
    SessionCounts, SessionStatus,
};

const PATIENT_SESSION_SELECT: &str = "SELECT ps.id, ps.session_id, es.title AS session_title,
        ps.patient_id, ps.assigned_by, ps.status, ps.due_date, ps.effort,
        ps.duration_minutes, ps.feedback, ps.assigned_at, ps.completed_at
     FROM patient_sessions ps
     JOIN exercise_sessions es ON es.id = ps.session_id";

#[instrument(skip(pool, request), fields(session_id = request.session_id, patient_id = request.patient_id))]
pub async fn assign_session(
    pool: &Pool<Sqlite>,
    assigned_by: i64,
    request: &AssignSessionRequest,
) -> Result<PatientSession, AppError> {
    info!("Assigning session to patient");

    get_exercise_session(pool, request.session_id).await?;

    let patient = get_user(pool, request.patient_id).await?;
    if patient.role != Role::Patient {
        warn!(role = %patient.role, "Refusing to assign a session to a non-patient");
        return Err(AppError::Validation(format!(
            "User {} is not a patient",
            request.patient_id
        )));
    }

    let res = sqlx::query(
        "INSERT INTO patient_sessions (session_id, patient_id, assigned_by, status, due_date, assigned_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(request.session_id)
    .bind(request.patient_id)
    .bind(assigned_by)
    .bind(SessionStatus::Assigned.as_str())
    .bind(request.due_date)
    .bind(Utc::now().naive_utc())
    .execute(pool)
    .await?;

    get_patient_session(pool, res.last_insert_rowid()).await
}

#[instrument(skip(pool))]
pub async fn get_patient_session(
    pool: &Pool<Sqlite>,
    id: i64,
) -> Result<PatientSession, AppError> {
    info!("Getting patient session");
    let row = sqlx::query_as::<_, DbPatientSession>(&format!(
        "{PATIENT_SESSION_SELECT} WHERE ps.id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(PatientSession::from)
        .ok_or_else(|| AppError::NotFound(format!("Patient session {} not found", id)))
}

/// Newest assignments first, optionally narrowed to one status.
#[instrument(skip(pool))]
pub async fn get_patient_sessions(
    pool: &Pool<Sqlite>,
    patient_id: i64,
    status: Option<SessionStatus>,
) -> Result<Vec<PatientSession>, AppError> {
    info!("Getting patient sessions");
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("{PATIENT_SESSION_SELECT} WHERE ps.patient_id = "));
    query.push_bind(patient_id);

    if let Some(status) = status {
        query.push(" AND ps.status = ").push_bind(status.as_str());
    }

    query.push(" ORDER BY ps.assigned_at DESC, ps.id DESC");

    let rows = query
        .build_query_as::<DbPatientSession>()
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(PatientSession::from).collect())
}

/// Moves an assigned session to `to`, crediting `reward` to the patient in
/// the same transaction. The UPDATE only matches rows still stored as
/// `assigned`, so two racing requests cannot both succeed.
async fn finish_session(
    pool: &Pool<Sqlite>,
    id: i64,
    to: SessionStatus,
    completion: Option<&CompleteSessionRequest>,
    reward: Option<Activity>,
) -> Result<PatientSession, AppError> {
    let current = get_patient_session(pool, id).await?;
    current.status.transition(to)?;

    let mut tx = pool.begin().await?;

    let res = sqlx::query(
        "UPDATE patient_sessions
         SET status = ?, effort = ?, duration_minutes = ?, feedback = ?, completed_at = ?
         WHERE id = ? AND status = ?",
    )
    .bind(to.as_str())
    .bind(completion.map(|c| c.effort))
    .bind(completion.map(|c| c.duration_minutes))
    .bind(completion.map(|c| c.feedback.as_str()).unwrap_or_default())
    .bind(Utc::now().naive_utc())
    .bind(id)
    .bind(SessionStatus::Assigned.as_str())
    .execute(&mut *tx)
    .await?;

    if res.rows_affected() == 0 {
        tx.rollback().await?;
        let latest = get_patient_session(pool, id).await?;
        latest.status.transition(to)?;
        warn!(patient_session_id = id, "Session row is not stored as assigned");
        return Err(AppError::Validation(format!(
            "Session {} is no longer assigned",
            id
        )));
    }

    if let Some(activity) = reward {
        record_activity(&mut tx, current.patient_id, activity, 1).await?;
    }
    tx.commit().await?;

    if reward.is_some() {
        award_badges(pool, current.patient_id).await;
    }
    get_patient_session(pool, id).await
}

#[instrument(skip(pool, completion), fields(effort = completion.effort, duration_minutes = completion.duration_minutes))]
pub async fn complete_patient_session(
    pool: &Pool<Sqlite>,
    id: i64,
    completion: &CompleteSessionRequest,
) -> Result<PatientSession, AppError> {
    info!("Completing patient session");
    finish_session(
        pool,
        id,
        SessionStatus::Done,
        Some(completion),
        Some(Activity::SessionCompleted),
    )
    .await
}

#[instrument(skip(pool))]
pub async fn skip_patient_session(pool: &Pool<Sqlite>, id: i64) -> Result<PatientSession, AppError> {
    info!("Skipping patient session");
    finish_session(pool, id, SessionStatus::Skipped, None, None).await
}

#[instrument(skip(pool))]
pub async fn count_patient_sessions(
    pool: &Pool<Sqlite>,
    patient_id: i64,
) -> Result<SessionCounts, AppError> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT status, COUNT(*) FROM patient_sessions WHERE patient_id = ? GROUP BY status",
    )
    .bind(patient_id)
    .fetch_all(pool)
    .await?;

    let mut counts = SessionCounts::default();
    for (status, count) in rows {
        match status.parse::<SessionStatus>() {
            Ok(SessionStatus::Assigned) => counts.assigned = count,
            Ok(SessionStatus::Done) => counts.done = count,
            Ok(SessionStatus::Skipped) => counts.skipped = count,
            Err(err) => warn!(error = %err, "Ignoring unknown session status"),
        }
    }
    Ok(counts)
}
