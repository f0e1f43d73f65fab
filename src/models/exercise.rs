use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::to_utc;

text_enum!(ExerciseCategory {
    CravingReduction => "craving_reduction",
    Relaxation => "relaxation",
    Energy => "energy",
    EmotionManagement => "emotion_management",
});

text_enum!(Difficulty {
    Beginner => "beginner",
    Intermediate => "intermediate",
    Advanced => "advanced",
});

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Exercise {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: ExerciseCategory,
    pub difficulty: Difficulty,
    pub duration_minutes: i64,
    pub instructions: String,
    pub benefits: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbExercise {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub duration_minutes: Option<i64>,
    pub instructions: Option<String>,
    pub benefits: Option<String>,
    pub is_active: Option<bool>,
    pub created_at: Option<NaiveDateTime>,
}

impl From<DbExercise> for Exercise {
    fn from(db: DbExercise) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            title: db.title.unwrap_or_default(),
            description: db.description.unwrap_or_default(),
            category: ExerciseCategory::parse_or_default(db.category.as_deref()),
            difficulty: Difficulty::parse_or_default(db.difficulty.as_deref()),
            duration_minutes: db.duration_minutes.unwrap_or_default(),
            instructions: db.instructions.unwrap_or_default(),
            benefits: db.benefits.unwrap_or_default(),
            is_active: db.is_active.unwrap_or(true),
            created_at: to_utc(db.created_at),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct ExerciseInput {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    pub category: ExerciseCategory,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[validate(range(min = 1, max = 240, message = "Duration must be between 1 and 240 minutes"))]
    pub duration_minutes: i64,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub instructions: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub benefits: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}
