use sqlx::{Pool, QueryBuilder, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{DbExercise, Difficulty, Exercise, ExerciseCategory, ExerciseInput};

const EXERCISE_COLUMNS: &str = "id, title, description, category, difficulty, duration_minutes,
     instructions, benefits, is_active, created_at";

#[derive(Debug, Default, Clone, Copy)]
pub struct ExerciseFilter {
    pub category: Option<ExerciseCategory>,
    pub difficulty: Option<Difficulty>,
    pub include_inactive: bool,
}

#[instrument(skip(pool))]
pub async fn get_exercises(
    pool: &Pool<Sqlite>,
    filter: ExerciseFilter,
) -> Result<Vec<Exercise>, AppError> {
    info!("Getting exercises");
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {EXERCISE_COLUMNS} FROM exercises WHERE 1 = 1"
    ));

    if let Some(category) = filter.category {
        query.push(" AND category = ").push_bind(category.as_str());
    }
    if let Some(difficulty) = filter.difficulty {
        query.push(" AND difficulty = ").push_bind(difficulty.as_str());
    }
    if !filter.include_inactive {
        query.push(" AND is_active = TRUE");
    }
    query.push(" ORDER BY title");

    let rows = query.build_query_as::<DbExercise>().fetch_all(pool).await?;
    Ok(rows.into_iter().map(Exercise::from).collect())
}

#[instrument(skip(pool))]
pub async fn get_exercise(pool: &Pool<Sqlite>, id: i64) -> Result<Exercise, AppError> {
    info!("Getting exercise");
    let row = sqlx::query_as::<_, DbExercise>(&format!(
        "SELECT {EXERCISE_COLUMNS} FROM exercises WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(Exercise::from)
        .ok_or_else(|| AppError::NotFound(format!("Exercise {} not found", id)))
}

#[instrument(skip(pool, exercise), fields(title = %exercise.title))]
pub async fn create_exercise(
    pool: &Pool<Sqlite>,
    exercise: &ExerciseInput,
) -> Result<Exercise, AppError> {
    info!("Creating exercise");
    let res = sqlx::query(
        "INSERT INTO exercises
         (title, description, category, difficulty, duration_minutes, instructions, benefits, is_active)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&exercise.title)
    .bind(&exercise.description)
    .bind(exercise.category.as_str())
    .bind(exercise.difficulty.as_str())
    .bind(exercise.duration_minutes)
    .bind(&exercise.instructions)
    .bind(&exercise.benefits)
    .bind(exercise.is_active)
    .execute(pool)
    .await?;

    get_exercise(pool, res.last_insert_rowid()).await
}

#[instrument(skip(pool, exercise))]
pub async fn update_exercise(
    pool: &Pool<Sqlite>,
    id: i64,
    exercise: &ExerciseInput,
) -> Result<Exercise, AppError> {
    info!("Updating exercise");
    let res = sqlx::query(
        "UPDATE exercises
         SET title = ?, description = ?, category = ?, difficulty = ?, duration_minutes = ?,
             instructions = ?, benefits = ?, is_active = ?
         WHERE id = ?",
    )
    .bind(&exercise.title)
    .bind(&exercise.description)
    .bind(exercise.category.as_str())
    .bind(exercise.difficulty.as_str())
    .bind(exercise.duration_minutes)
    .bind(&exercise.instructions)
    .bind(&exercise.benefits)
    .bind(exercise.is_active)
    .bind(id)
    .execute(pool)
    .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Exercise {} not found", id)));
    }
    get_exercise(pool, id).await
}

#[instrument(skip(pool))]
pub async fn delete_exercise(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting exercise");
    let res = sqlx::query("DELETE FROM exercises WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Exercise {} not found", id)));
    }
    Ok(())
}
