#[cfg(test)]
mod tests {
    use crate::db::{get_user, record_activity, refresh_badges};
    use crate::error::AppError;
    use crate::gamification::{
        Activity, ActivityCounts, Badge, POINTS_PER_LEVEL, earned_badges, level_for_points,
    };
    use crate::models::Dashboard;
    use crate::test::test_client::{login_test_user, post_json, read_json, setup_test_client};
    use crate::test::test_db::{TestDbBuilder, create_standard_test_db};
    use rocket::http::Status;
    use rocket::tokio;
    use serde_json::json;

    #[test]
    fn test_level_thresholds() {
        assert_eq!(level_for_points(0), 1);
        assert_eq!(level_for_points(POINTS_PER_LEVEL - 1), 1);
        assert_eq!(level_for_points(POINTS_PER_LEVEL), 2);
        assert_eq!(level_for_points(450), 5);
        assert_eq!(level_for_points(-20), 1);
    }

    #[test]
    fn test_badge_thresholds() {
        assert!(earned_badges(&ActivityCounts::default()).is_empty());

        let counts = ActivityCounts {
            cravings: 7,
            beck_analyses: 4,
            strategies: 10,
            sessions_completed: 1,
            level: 5,
        };
        assert_eq!(
            earned_badges(&counts),
            vec![
                Badge::FirstCraving,
                Badge::CravingTracker,
                Badge::Strategist,
                Badge::FirstSession,
                Badge::LevelFive,
            ]
        );
    }

    #[test]
    fn test_badge_names_parse_back() {
        for badge in Badge::ALL {
            assert_eq!(badge.as_str().parse::<Badge>().ok(), Some(badge));
        }
        assert!("gold_star".parse::<Badge>().is_err());
    }

    #[tokio::test]
    async fn test_record_activity_updates_level_and_badges_once() {
        let test_db = TestDbBuilder::new()
            .patient("gamer@example.com", "Gina")
            .build()
            .await
            .expect("Failed to build test database");
        let user_id = test_db.user_id("gamer@example.com").expect("user missing");

        let mut tx = test_db.pool.begin().await.expect("Failed to begin");
        let (points, level) = record_activity(&mut tx, user_id, Activity::SessionCompleted, 9)
            .await
            .expect("Failed to record activity");
        tx.commit().await.expect("Failed to commit");
        assert_eq!(points, 450);
        assert_eq!(level, 5);

        let user = get_user(&test_db.pool, user_id).await.expect("user missing");
        assert_eq!(user.points, 450);
        assert_eq!(user.level, 5);

        let awarded = refresh_badges(&test_db.pool, user_id)
            .await
            .expect("Failed to refresh badges");
        assert_eq!(awarded, vec![Badge::LevelFive]);

        let awarded = refresh_badges(&test_db.pool, user_id)
            .await
            .expect("Failed to refresh badges");
        assert!(awarded.is_empty(), "Badges are only awarded once");
    }

    #[tokio::test]
    async fn test_uncommitted_activity_leaves_points_untouched() {
        let test_db = TestDbBuilder::new()
            .patient("gamer@example.com", "Gina")
            .build()
            .await
            .expect("Failed to build test database");
        let user_id = test_db.user_id("gamer@example.com").expect("user missing");

        {
            let mut tx = test_db.pool.begin().await.expect("Failed to begin");
            record_activity(&mut tx, user_id, Activity::CravingLogged, 3)
                .await
                .expect("Failed to record activity");
        }

        let user = get_user(&test_db.pool, user_id).await.expect("user missing");
        assert_eq!(user.points, 0);
        assert_eq!(user.level, 1);
    }

    #[tokio::test]
    async fn test_record_activity_for_missing_user() {
        let test_db = TestDbBuilder::new()
            .build()
            .await
            .expect("Failed to build test database");

        let mut tx = test_db.pool.begin().await.expect("Failed to begin");
        let result = record_activity(&mut tx, 4242, Activity::CravingLogged, 1).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[rocket::async_test]
    async fn test_dashboard_tracks_points_and_badges() {
        let (client, _db) = setup_test_client(create_standard_test_db().await).await;
        login_test_user(&client, "alice@example.com").await;

        post_json(&client, "/api/cravings", json!({ "intensity": 6 })).await;

        let dashboard: Dashboard = read_json(client.get("/api/dashboard").dispatch().await).await;
        assert_eq!(dashboard.points, Activity::CravingLogged.points());
        assert_eq!(dashboard.level, 1);
        assert_eq!(dashboard.points_to_next_level, 90);
        assert_eq!(dashboard.craving_entries, 1);
        assert_eq!(dashboard.average_craving_last_7_days, Some(6.0));
        assert_eq!(dashboard.badges.len(), 1);
        assert_eq!(dashboard.badges[0].badge, Badge::FirstCraving);

        for _ in 0..7 {
            post_json(&client, "/api/cravings", json!({ "intensity": 2 })).await;
        }

        let dashboard: Dashboard = read_json(client.get("/api/dashboard").dispatch().await).await;
        assert_eq!(dashboard.points, 80);
        let badges: Vec<Badge> = dashboard.badges.iter().map(|b| b.badge).collect();
        assert_eq!(badges, vec![Badge::FirstCraving, Badge::CravingTracker]);

        post_json(
            &client,
            "/api/beck-analyses",
            json!({ "situation": "Payday", "automatic_thoughts": "I deserve it" }),
        )
        .await;

        let dashboard: Dashboard = read_json(client.get("/api/dashboard").dispatch().await).await;
        assert_eq!(dashboard.points, 100);
        assert_eq!(dashboard.level, 2);
        assert_eq!(dashboard.points_to_next_level, 100);
        assert_eq!(dashboard.beck_analyses, 1);
    }

    #[rocket::async_test]
    async fn test_therapist_dashboard_access() {
        let (client, db) = setup_test_client(create_standard_test_db().await).await;
        let alice = db.user_id("alice@example.com").expect("alice missing");
        let therapist = db.user_id("therapist@example.com").expect("therapist missing");

        let alice_uri = format!("/api/admin/patients/{}/dashboard", alice);
        let therapist_uri = format!("/api/admin/patients/{}/dashboard", therapist);

        login_test_user(&client, "bob@example.com").await;
        assert_eq!(
            client.get(alice_uri.as_str()).dispatch().await.status(),
            Status::Forbidden
        );

        login_test_user(&client, "therapist@example.com").await;
        let dashboard: Dashboard =
            read_json(client.get(alice_uri.as_str()).dispatch().await).await;
        assert_eq!(dashboard.user_id, alice);
        assert_eq!(dashboard.sessions.done, 0);

        assert_eq!(
            client.get(therapist_uri.as_str()).dispatch().await.status(),
            Status::NotFound
        );
    }

    #[rocket::async_test]
    async fn test_journal_writes_roll_back_when_points_fail() {
        let (client, db) = setup_test_client(create_standard_test_db().await).await;
        login_test_user(&client, "alice@example.com").await;
        db.freeze_points().await;

        let response = post_json(&client, "/api/cravings", json!({ "intensity": 7 })).await;
        assert_eq!(response.status(), Status::InternalServerError);

        let response = post_json(
            &client,
            "/api/beck-analyses",
            json!({ "situation": "Payday", "automatic_thoughts": "I deserve it" }),
        )
        .await;
        assert_eq!(response.status(), Status::InternalServerError);

        let response = post_json(
            &client,
            "/api/strategies",
            json!({ "strategies": [{
                "context": "home",
                "exercise": "Walk",
                "effort": "low",
                "duration_minutes": 10,
                "craving_before": 6,
                "craving_after": 3
            }] }),
        )
        .await;
        assert_eq!(response.status(), Status::InternalServerError);

        db.thaw_points().await;

        let dashboard: Dashboard = read_json(client.get("/api/dashboard").dispatch().await).await;
        assert_eq!(dashboard.points, 0);
        assert_eq!(dashboard.craving_entries, 0);
        assert_eq!(dashboard.beck_analyses, 0);
        assert_eq!(dashboard.strategies, 0);
        assert!(dashboard.badges.is_empty());
    }
}
