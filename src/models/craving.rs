use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{parse_string_list, to_utc};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CravingEntry {
    pub id: i64,
    pub user_id: i64,
    pub intensity: i64,
    pub triggers: Vec<String>,
    pub emotions: Vec<String>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbCravingEntry {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub intensity: Option<i64>,
    pub triggers: Option<String>,
    pub emotions: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl From<DbCravingEntry> for CravingEntry {
    fn from(db: DbCravingEntry) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            user_id: db.user_id.unwrap_or_default(),
            intensity: db.intensity.unwrap_or_default(),
            triggers: parse_string_list(db.triggers),
            emotions: parse_string_list(db.emotions),
            notes: db.notes.unwrap_or_default(),
            created_at: to_utc(db.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyIntensity {
    pub day: NaiveDate,
    pub average_intensity: f64,
    pub entries: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CravingStats {
    pub days: i64,
    pub total_entries: i64,
    pub average_intensity: Option<f64>,
    pub min_intensity: Option<i64>,
    pub max_intensity: Option<i64>,
    pub top_triggers: Vec<LabelCount>,
    pub top_emotions: Vec<LabelCount>,
    pub daily: Vec<DailyIntensity>,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct NewCravingEntry {
    #[validate(range(min = 0, max = 10, message = "Intensity must be between 0 and 10"))]
    pub intensity: i64,
    #[serde(default)]
    #[validate(length(max = 20, message = "At most 20 triggers can be recorded"))]
    pub triggers: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 20, message = "At most 20 emotions can be recorded"))]
    pub emotions: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Notes are limited to 2000 characters"))]
    pub notes: String,
}
