use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use super::{ExerciseCategory, to_utc};
use crate::error::AppError;
use crate::protocol::{Protocol, ProtocolKind};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionExercise {
    pub exercise_id: i64,
    pub position: i64,
    pub title: String,
    pub duration_minutes: i64,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbSessionExercise {
    pub exercise_id: Option<i64>,
    pub position: Option<i64>,
    pub title: Option<String>,
    pub duration_minutes: Option<i64>,
}

impl From<DbSessionExercise> for SessionExercise {
    fn from(db: DbSessionExercise) -> Self {
        Self {
            exercise_id: db.exercise_id.unwrap_or_default(),
            position: db.position.unwrap_or_default(),
            title: db.title.unwrap_or_default(),
            duration_minutes: db.duration_minutes.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExerciseSession {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: ExerciseCategory,
    pub protocol: ProtocolKind,
    pub protocol_config: Protocol,
    pub total_seconds: i64,
    pub work_seconds: i64,
    pub rest_seconds: i64,
    pub intensity_percent: i64,
    pub created_by: Option<i64>,
    pub exercises: Vec<SessionExercise>,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbExerciseSession {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub protocol_config: Option<String>,
    pub total_seconds: Option<i64>,
    pub work_seconds: Option<i64>,
    pub rest_seconds: Option<i64>,
    pub intensity_percent: Option<i64>,
    pub created_by: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
}

impl TryFrom<DbExerciseSession> for ExerciseSession {
    type Error = AppError;

    fn try_from(db: DbExerciseSession) -> Result<Self, Self::Error> {
        let protocol_config: Protocol =
            serde_json::from_str(db.protocol_config.as_deref().unwrap_or_default())?;

        Ok(Self {
            id: db.id.unwrap_or_default(),
            title: db.title.unwrap_or_default(),
            description: db.description.unwrap_or_default(),
            category: ExerciseCategory::parse_or_default(db.category.as_deref()),
            protocol: protocol_config.kind(),
            protocol_config,
            total_seconds: db.total_seconds.unwrap_or_default(),
            work_seconds: db.work_seconds.unwrap_or_default(),
            rest_seconds: db.rest_seconds.unwrap_or_default(),
            intensity_percent: db.intensity_percent.unwrap_or_default(),
            created_by: db.created_by,
            exercises: Vec::new(),
            created_at: to_utc(db.created_at),
        })
    }
}

text_enum!(SessionStatus {
    Assigned => "assigned",
    Done => "done",
    Skipped => "skipped",
});

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Session cannot move from {from} to {to}")]
pub struct TransitionError {
    pub from: SessionStatus,
    pub to: SessionStatus,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Assigned)
    }

    /// The only legal moves are `assigned -> done` and `assigned -> skipped`.
    pub fn transition(self, to: SessionStatus) -> Result<SessionStatus, TransitionError> {
        match (self, to) {
            (SessionStatus::Assigned, SessionStatus::Done | SessionStatus::Skipped) => Ok(to),
            (from, to) => Err(TransitionError { from, to }),
        }
    }
}

impl From<TransitionError> for AppError {
    fn from(error: TransitionError) -> Self {
        AppError::Validation(error.to_string())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PatientSession {
    pub id: i64,
    pub session_id: i64,
    pub session_title: String,
    pub patient_id: i64,
    pub assigned_by: Option<i64>,
    pub status: SessionStatus,
    pub due_date: Option<NaiveDate>,
    pub effort: Option<i64>,
    pub duration_minutes: Option<i64>,
    pub feedback: String,
    pub assigned_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbPatientSession {
    pub id: Option<i64>,
    pub session_id: Option<i64>,
    pub session_title: Option<String>,
    pub patient_id: Option<i64>,
    pub assigned_by: Option<i64>,
    pub status: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub effort: Option<i64>,
    pub duration_minutes: Option<i64>,
    pub feedback: Option<String>,
    pub assigned_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
}

impl From<DbPatientSession> for PatientSession {
    fn from(db: DbPatientSession) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            session_id: db.session_id.unwrap_or_default(),
            session_title: db.session_title.unwrap_or_default(),
            patient_id: db.patient_id.unwrap_or_default(),
            assigned_by: db.assigned_by,
            status: SessionStatus::parse_or_default(db.status.as_deref()),
            due_date: db.due_date,
            effort: db.effort,
            duration_minutes: db.duration_minutes,
            feedback: db.feedback.unwrap_or_default(),
            assigned_at: to_utc(db.assigned_at),
            completed_at: db.completed_at.map(|dt| to_utc(Some(dt))),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct SessionInput {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    pub category: ExerciseCategory,
    pub protocol: Protocol,
    #[serde(default)]
    #[validate(length(max = 100, message = "A session holds at most 100 exercises"))]
    pub exercise_ids: Vec<i64>,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct AssignSessionRequest {
    pub session_id: i64,
    pub patient_id: i64,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct CompleteSessionRequest {
    #[validate(range(min = 1, max = 10, message = "Effort must be between 1 and 10"))]
    pub effort: i64,
    #[validate(range(min = 1, max = 600, message = "Duration must be greater than zero"))]
    pub duration_minutes: i64,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub feedback: String,
}
