use chrono::Utc;
use sqlx::{Pool, QueryBuilder, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{ContentCategory, ContentInput, DbEducationalContent, EducationalContent};

const CONTENT_COLUMNS: &str =
    "id, title, category, content_type, content, media_url, is_published, created_at, updated_at";

#[instrument(skip(pool))]
pub async fn get_educational_contents(
    pool: &Pool<Sqlite>,
    category: Option<ContentCategory>,
    include_unpublished: bool,
) -> Result<Vec<EducationalContent>, AppError> {
    info!("Getting educational contents");
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {CONTENT_COLUMNS} FROM educational_contents WHERE 1 = 1"
    ));

    if let Some(category) = category {
        query.push(" AND category = ").push_bind(category.as_str());
    }
    if !include_unpublished {
        query.push(" AND is_published = TRUE");
    }
    query.push(" ORDER BY created_at DESC, id DESC");

    let rows = query
        .build_query_as::<DbEducationalContent>()
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(EducationalContent::from).collect())
}

#[instrument(skip(pool))]
pub async fn get_educational_content(
    pool: &Pool<Sqlite>,
    id: i64,
) -> Result<EducationalContent, AppError> {
    info!("Getting educational content");
    let row = sqlx::query_as::<_, DbEducationalContent>(&format!(
        "SELECT {CONTENT_COLUMNS} FROM educational_contents WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(EducationalContent::from)
        .ok_or_else(|| AppError::NotFound(format!("Educational content {} not found", id)))
}

#[instrument(skip(pool, content), fields(title = %content.title))]
pub async fn create_educational_content(
    pool: &Pool<Sqlite>,
    content: &ContentInput,
) -> Result<EducationalContent, AppError> {
    info!("Creating educational content");
    let res = sqlx::query(
        "INSERT INTO educational_contents
         (title, category, content_type, content, media_url, is_published)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&content.title)
    .bind(content.category.as_str())
    .bind(content.content_type.as_str())
    .bind(&content.content)
    .bind(&content.media_url)
    .bind(content.is_published)
    .execute(pool)
    .await?;

    get_educational_content(pool, res.last_insert_rowid()).await
}

#[instrument(skip(pool, content))]
pub async fn update_educational_content(
    pool: &Pool<Sqlite>,
    id: i64,
    content: &ContentInput,
) -> Result<EducationalContent, AppError> {
    info!("Updating educational content");
    let now = Utc::now().naive_utc();
    let res = sqlx::query(
        "UPDATE educational_contents
         SET title = ?, category = ?, content_type = ?, content = ?, media_url = ?,
             is_published = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&content.title)
    .bind(content.category.as_str())
    .bind(content.content_type.as_str())
    .bind(&content.content)
    .bind(&content.media_url)
    .bind(content.is_published)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Educational content {} not found",
            id
        )));
    }
    get_educational_content(pool, id).await
}

#[instrument(skip(pool))]
pub async fn delete_educational_content(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting educational content");
    let res = sqlx::query("DELETE FROM educational_contents WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Educational content {} not found",
            id
        )));
    }
    Ok(())
}
