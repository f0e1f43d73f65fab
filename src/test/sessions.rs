#[cfg(test)]
mod tests {
    use crate::{
        auth::UserSession,
        db::{
            clean_expired_sessions, create_user_session, get_session_by_token, invalidate_session,
            invalidate_user_sessions,
        },
        error::AppError,
        test::test_db::TestDbBuilder,
    };
    use chrono::{Duration, NaiveDateTime, Utc};
    use rocket::tokio;
    use sqlx::{Pool, Sqlite};
    use uuid::Uuid;

    async fn create_test_session() -> (i64, String, NaiveDateTime, Pool<Sqlite>) {
        let test_db = TestDbBuilder::new()
            .patient("session_user@example.com", "Sam")
            .build()
            .await
            .expect("Failed to build test database");

        let user_id = test_db
            .user_id("session_user@example.com")
            .expect("User not found");

        let token = format!("test_token_{}", Uuid::new_v4());

        let expires_at = (Utc::now() + Duration::hours(1)).naive_utc();

        (user_id, token, expires_at, test_db.pool)
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let (user_id, token, expires_at, pool) = create_test_session().await;

        let session_id = create_user_session(&pool, user_id, &token, expires_at)
            .await
            .expect("Failed to create session");

        assert!(session_id > 0, "Session ID should be positive");

        let session = get_session_by_token(&pool, &token)
            .await
            .expect("Failed to get session");

        assert_eq!(session.user_id, user_id);
        assert_eq!(session.id, session_id);
        assert!(session.is_valid());

        let expires_diff =
            (session.expires_at.and_utc().timestamp() - expires_at.and_utc().timestamp()).abs();
        assert!(
            expires_diff <= 1,
            "Expiration timestamps should match within 1 second"
        );
    }

    #[tokio::test]
    async fn test_get_nonexistent_session() {
        let (_, _, _, pool) = create_test_session().await;

        let result = get_session_by_token(&pool, "nonexistent_token").await;

        match result {
            Err(AppError::Authentication(msg)) => assert_eq!(msg, "Invalid session token"),
            other => panic!("Expected Authentication error, got {:?}", other.map(|s| s.id)),
        }
    }

    #[tokio::test]
    async fn test_invalidate_session() {
        let (user_id, token, expires_at, pool) = create_test_session().await;

        create_user_session(&pool, user_id, &token, expires_at)
            .await
            .expect("Failed to create session");

        assert!(get_session_by_token(&pool, &token).await.is_ok());

        invalidate_session(&pool, &token)
            .await
            .expect("Failed to invalidate session");

        assert!(
            get_session_by_token(&pool, &token).await.is_err(),
            "Session should not exist after invalidation"
        );
    }

    #[tokio::test]
    async fn test_invalidate_all_user_sessions() {
        let (user_id, token, expires_at, pool) = create_test_session().await;
        let other_token = format!("other_{}", Uuid::new_v4());

        create_user_session(&pool, user_id, &token, expires_at)
            .await
            .expect("Failed to create session");
        create_user_session(&pool, user_id, &other_token, expires_at)
            .await
            .expect("Failed to create second session");

        let removed = invalidate_user_sessions(&pool, user_id)
            .await
            .expect("Failed to invalidate sessions");

        assert_eq!(removed, 2);
        assert!(get_session_by_token(&pool, &other_token).await.is_err());
    }

    #[tokio::test]
    async fn test_clean_expired_sessions() {
        let (user_id, _, _, pool) = create_test_session().await;

        let expired = format!("test_token_expired_{}", Uuid::new_v4());
        let soon = format!("test_token_soon_{}", Uuid::new_v4());
        let later = format!("test_token_later_{}", Uuid::new_v4());

        create_user_session(&pool, user_id, &expired, (Utc::now() - Duration::hours(1)).naive_utc())
            .await
            .expect("Failed to create expired session");
        create_user_session(&pool, user_id, &soon, (Utc::now() + Duration::minutes(1)).naive_utc())
            .await
            .expect("Failed to create expiring soon session");
        create_user_session(&pool, user_id, &later, (Utc::now() + Duration::days(1)).naive_utc())
            .await
            .expect("Failed to create future session");

        let cleaned = clean_expired_sessions(&pool)
            .await
            .expect("Failed to clean sessions");

        assert_eq!(cleaned, 1, "Only the expired session should be removed");
        assert!(get_session_by_token(&pool, &expired).await.is_err());
        assert!(get_session_by_token(&pool, &soon).await.is_ok());
        assert!(get_session_by_token(&pool, &later).await.is_ok());
    }

    #[test]
    fn test_generated_tokens_are_unique_and_alphanumeric() {
        let first = UserSession::generate_token();
        let second = UserSession::generate_token();

        assert_eq!(first.len(), 48);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }
}
