use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::to_utc;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BeckAnalysis {
    pub id: i64,
    pub user_id: i64,
    pub situation: String,
    pub automatic_thoughts: String,
    pub emotions: String,
    pub emotion_intensity: Option<i64>,
    pub rational_response: String,
    pub new_feeling: String,
    pub new_intensity: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbBeckAnalysis {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub situation: Option<String>,
    pub automatic_thoughts: Option<String>,
    pub emotions: Option<String>,
    pub emotion_intensity: Option<i64>,
    pub rational_response: Option<String>,
    pub new_feeling: Option<String>,
    pub new_intensity: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
}

impl From<DbBeckAnalysis> for BeckAnalysis {
    fn from(db: DbBeckAnalysis) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            user_id: db.user_id.unwrap_or_default(),
            situation: db.situation.unwrap_or_default(),
            automatic_thoughts: db.automatic_thoughts.unwrap_or_default(),
            emotions: db.emotions.unwrap_or_default(),
            emotion_intensity: db.emotion_intensity,
            rational_response: db.rational_response.unwrap_or_default(),
            new_feeling: db.new_feeling.unwrap_or_default(),
            new_intensity: db.new_intensity,
            created_at: to_utc(db.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct NewBeckAnalysis {
    #[validate(length(min = 1, max = 2000, message = "Describe the situation"))]
    pub situation: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub automatic_thoughts: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub emotions: String,
    #[validate(range(min = 0, max = 10, message = "Intensity must be between 0 and 10"))]
    pub emotion_intensity: Option<i64>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub rational_response: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub new_feeling: String,
    #[validate(range(min = 0, max = 10, message = "Intensity must be between 0 and 10"))]
    pub new_intensity: Option<i64>,
}
