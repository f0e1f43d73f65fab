use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::to_utc;

text_enum!(ContentCategory {
    Addiction => "addiction",
    Exercise => "exercise",
    Psychology => "psychology",
    Techniques => "techniques",
});

text_enum!(ContentType {
    Text => "text",
    Video => "video",
    Audio => "audio",
    Pdf => "pdf",
});

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EducationalContent {
    pub id: i64,
    pub title: String,
    pub category: ContentCategory,
    pub content_type: ContentType,
    pub content: String,
    pub media_url: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbEducationalContent {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub content_type: Option<String>,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub is_published: Option<bool>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl From<DbEducationalContent> for EducationalContent {
    fn from(db: DbEducationalContent) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            title: db.title.unwrap_or_default(),
            category: ContentCategory::parse_or_default(db.category.as_deref()),
            content_type: ContentType::parse_or_default(db.content_type.as_deref()),
            content: db.content.unwrap_or_default(),
            media_url: db.media_url,
            is_published: db.is_published.unwrap_or_default(),
            created_at: to_utc(db.created_at),
            updated_at: to_utc(db.updated_at),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct ContentInput {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    pub category: ContentCategory,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    #[validate(length(max = 50000))]
    pub content: String,
    #[validate(url(message = "Media URL must be a valid URL"))]
    pub media_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_published: bool,
}
