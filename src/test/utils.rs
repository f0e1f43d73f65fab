#[cfg(test)]
pub mod test_db {
    use crate::auth::Role;
    use crate::db::{create_exercise, create_user};
    use crate::error::AppError;
    use crate::models::{Difficulty, ExerciseCategory, ExerciseInput};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::{Pool, Sqlite};
    use std::collections::HashMap;
    use std::sync::Once;

    static INIT: Once = Once::new();
    pub static STANDARD_PASSWORD: &str = "password123";

    #[derive(Default)]
    pub struct TestDbBuilder {
        users: Vec<TestUser>,
        exercises: Vec<TestExercise>,
    }

    pub struct TestUser {
        pub email: String,
        pub first_name: String,
        pub role: Role,
        pub password: String,
    }

    pub struct TestExercise {
        pub title: String,
        pub category: ExerciseCategory,
        pub is_active: bool,
    }

    impl TestDbBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn patient(mut self, email: &str, first_name: &str) -> Self {
            self.users.push(TestUser {
                email: email.to_string(),
                first_name: first_name.to_string(),
                role: Role::Patient,
                password: STANDARD_PASSWORD.to_string(),
            });
            self
        }

        pub fn admin(mut self, email: &str, first_name: &str) -> Self {
            self.users.push(TestUser {
                email: email.to_string(),
                first_name: first_name.to_string(),
                role: Role::Admin,
                password: STANDARD_PASSWORD.to_string(),
            });
            self
        }

        pub fn exercise(mut self, title: &str, category: ExerciseCategory) -> Self {
            self.exercises.push(TestExercise {
                title: title.to_string(),
                category,
                is_active: true,
            });
            self
        }

        pub fn inactive_exercise(mut self, title: &str, category: ExerciseCategory) -> Self {
            self.exercises.push(TestExercise {
                title: title.to_string(),
                category,
                is_active: false,
            });
            self
        }

        pub async fn build(self) -> Result<TestDb, AppError> {
            INIT.call_once(|| {
                let _ = env_logger::builder()
                    .parse_filters("debug")
                    .is_test(true)
                    .try_init();
            });

            // A single long-lived connection keeps the in-memory database alive.
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect("sqlite::memory:")
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;

            let mut user_id_map: HashMap<String, i64> = HashMap::new();
            let mut exercise_id_map: HashMap<String, i64> = HashMap::new();

            for user in &self.users {
                let user_id = create_user(
                    &pool,
                    &user.email,
                    &user.password,
                    &user.first_name,
                    "Test",
                    user.role,
                )
                .await?;

                user_id_map.insert(user.email.clone(), user_id);
            }

            for exercise in &self.exercises {
                let input = ExerciseInput {
                    title: exercise.title.clone(),
                    description: format!("{} description", exercise.title),
                    category: exercise.category,
                    difficulty: Difficulty::Beginner,
                    duration_minutes: 5,
                    instructions: String::new(),
                    benefits: String::new(),
                    is_active: exercise.is_active,
                };
                let created = create_exercise(&pool, &input).await?;

                exercise_id_map.insert(exercise.title.clone(), created.id);
            }

            Ok(TestDb {
                pool,
                user_id_map,
                exercise_id_map,
            })
        }
    }

    pub struct TestDb {
        pub pool: Pool<Sqlite>,
        pub user_id_map: HashMap<String, i64>,
        pub exercise_id_map: HashMap<String, i64>,
    }

    impl TestDb {
        pub fn user_id(&self, email: &str) -> Option<i64> {
            self.user_id_map.get(email).copied()
        }

        pub fn exercise_id(&self, title: &str) -> Option<i64> {
            self.exercise_id_map.get(title).copied()
        }

        /// Makes every points update fail, as a broken gamification write would.
        pub async fn freeze_points(&self) {
            sqlx::query(
                "CREATE TRIGGER freeze_points BEFORE UPDATE OF points ON users
                 BEGIN SELECT RAISE(ABORT, 'points are frozen'); END",
            )
            .execute(&self.pool)
            .await
            .expect("Failed to create trigger");
        }

        pub async fn thaw_points(&self) {
            sqlx::query("DROP TRIGGER freeze_points")
                .execute(&self.pool)
                .await
                .expect("Failed to drop trigger");
        }

        /// Stores a status the CHECK constraint would normally refuse.
        pub async fn corrupt_session_status(&self, patient_session_id: i64, status: &str) {
            let mut conn = self.pool.acquire().await.expect("Failed to acquire");
            sqlx::query("PRAGMA ignore_check_constraints = ON")
                .execute(&mut *conn)
                .await
                .expect("Failed to relax checks");
            sqlx::query("UPDATE patient_sessions SET status = ? WHERE id = ?")
                .bind(status)
                .bind(patient_session_id)
                .execute(&mut *conn)
                .await
                .expect("Failed to store status");
            sqlx::query("PRAGMA ignore_check_constraints = OFF")
                .execute(&mut *conn)
                .await
                .expect("Failed to restore checks");
        }
    }

    /// One therapist, two patients and a small exercise library.
    pub async fn create_standard_test_db() -> TestDb {
        TestDbBuilder::new()
            .admin("therapist@example.com", "Theo")
            .patient("alice@example.com", "Alice")
            .patient("bob@example.com", "Bob")
            .exercise("Box breathing", ExerciseCategory::Relaxation)
            .exercise("Urge surfing", ExerciseCategory::CravingReduction)
            .inactive_exercise("Retired drill", ExerciseCategory::Energy)
            .build()
            .await
            .expect("Failed to build test database")
    }
}

#[cfg(test)]
pub mod test_client {
    use super::test_db::{STANDARD_PASSWORD, TestDb};
    use crate::env::AppConfig;
    use crate::init_rocket;
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::{Client, LocalResponse};
    use serde::de::DeserializeOwned;
    use serde_json::{Value, json};

    /// The client keeps cookies between requests, so logging in as another
    /// user replaces the current session.
    pub async fn setup_test_client(test_db: TestDb) -> (Client, TestDb) {
        let rocket = init_rocket(test_db.pool.clone(), AppConfig::default()).await;
        let client = Client::tracked(rocket)
            .await
            .expect("Failed to create test client");
        (client, test_db)
    }

    pub async fn login_test_user(client: &Client, email: &str) -> Status {
        let response = client
            .post("/api/auth/login")
            .header(ContentType::JSON)
            .body(json!({ "email": email, "password": STANDARD_PASSWORD }).to_string())
            .dispatch()
            .await;
        response.status()
    }

    pub async fn post_json<'c>(client: &'c Client, uri: &'c str, body: Value) -> LocalResponse<'c> {
        client
            .post(uri)
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await
    }

    pub async fn put_json<'c>(client: &'c Client, uri: &'c str, body: Value) -> LocalResponse<'c> {
        client
            .put(uri)
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await
    }

    pub async fn read_json<T: DeserializeOwned>(response: LocalResponse<'_>) -> T {
        let body = response
            .into_string()
            .await
            .expect("Response had no body");
        serde_json::from_str(&body).unwrap_or_else(|e| panic!("Bad JSON ({}): {}", e, body))
    }
}
