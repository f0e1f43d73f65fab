use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::to_utc;

text_enum!(StrategyContext {
    Leisure => "leisure",
    Home => "home",
    Work => "work",
});

text_enum!(Effort {
    Low => "low",
    Medium => "medium",
    High => "high",
});

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AntiCravingStrategy {
    pub id: i64,
    pub user_id: i64,
    pub context: StrategyContext,
    pub exercise: String,
    pub effort: Effort,
    pub duration_minutes: i64,
    pub craving_before: i64,
    pub craving_after: i64,
    /// Positive when the strategy lowered the craving.
    pub craving_reduction: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbAntiCravingStrategy {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub context: Option<String>,
    pub exercise: Option<String>,
    pub effort: Option<String>,
    pub duration_minutes: Option<i64>,
    pub craving_before: Option<i64>,
    pub craving_after: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl From<DbAntiCravingStrategy> for AntiCravingStrategy {
    fn from(db: DbAntiCravingStrategy) -> Self {
        let craving_before = db.craving_before.unwrap_or_default();
        let craving_after = db.craving_after.unwrap_or_default();
        Self {
            id: db.id.unwrap_or_default(),
            user_id: db.user_id.unwrap_or_default(),
            context: StrategyContext::parse_or_default(db.context.as_deref()),
            exercise: db.exercise.unwrap_or_default(),
            effort: Effort::parse_or_default(db.effort.as_deref()),
            duration_minutes: db.duration_minutes.unwrap_or_default(),
            craving_before,
            craving_after,
            craving_reduction: craving_before - craving_after,
            created_at: to_utc(db.created_at),
            updated_at: to_utc(db.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct StrategyInput {
    pub context: StrategyContext,
    #[validate(length(min = 1, max = 500, message = "Describe the exercise"))]
    pub exercise: String,
    pub effort: Effort,
    #[validate(range(min = 1, max = 600, message = "Duration must be between 1 and 600 minutes"))]
    pub duration_minutes: i64,
    #[validate(range(min = 0, max = 10, message = "Craving level must be between 0 and 10"))]
    pub craving_before: i64,
    #[validate(range(min = 0, max = 10, message = "Craving level must be between 0 and 10"))]
    pub craving_after: i64,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct SaveStrategiesRequest {
    #[validate(length(min = 1, max = 50, message = "Save between 1 and 50 strategies"), nested)]
    pub strategies: Vec<StrategyInput>,
}
