#[cfg(test)]
mod tests {
    use crate::models::AntiCravingStrategy;
    use crate::test::test_client::{
        login_test_user, post_json, put_json, read_json, setup_test_client,
    };
    use crate::test::test_db::create_standard_test_db;
    use rocket::http::Status;
    use serde_json::{Value, json};

    fn strategy(exercise: &str, before: i64, after: i64) -> Value {
        json!({
            "context": "home",
            "exercise": exercise,
            "effort": "medium",
            "duration_minutes": 10,
            "craving_before": before,
            "craving_after": after
        })
    }

    #[rocket::async_test]
    async fn test_save_strategy_batch() {
        let (client, _db) = setup_test_client(create_standard_test_db().await).await;
        login_test_user(&client, "alice@example.com").await;

        let response = post_json(
            &client,
            "/api/strategies",
            json!({ "strategies": [strategy("Cold shower", 8, 3), strategy("Walk", 6, 4)] }),
        )
        .await;
        assert_eq!(response.status(), Status::Created);

        let saved: Vec<AntiCravingStrategy> = read_json(response).await;
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].craving_reduction, 5);

        let listed: Vec<AntiCravingStrategy> =
            read_json(client.get("/api/strategies").dispatch().await).await;
        assert_eq!(listed.len(), 2);
    }

    #[rocket::async_test]
    async fn test_invalid_batch_saves_nothing() {
        let (client, _db) = setup_test_client(create_standard_test_db().await).await;
        login_test_user(&client, "alice@example.com").await;

        let response = post_json(
            &client,
            "/api/strategies",
            json!({ "strategies": [strategy("Walk", 6, 4), strategy("Run", 11, 2)] }),
        )
        .await;
        assert_eq!(response.status(), Status::BadRequest);

        let response = post_json(&client, "/api/strategies", json!({ "strategies": [] })).await;
        assert_eq!(response.status(), Status::BadRequest);

        let listed: Vec<AntiCravingStrategy> =
            read_json(client.get("/api/strategies").dispatch().await).await;
        assert!(listed.is_empty());
    }

    #[rocket::async_test]
    async fn test_update_and_delete_strategy() {
        let (client, _db) = setup_test_client(create_standard_test_db().await).await;
        login_test_user(&client, "alice@example.com").await;

        let saved: Vec<AntiCravingStrategy> = read_json(
            post_json(
                &client,
                "/api/strategies",
                json!({ "strategies": [strategy("Call a friend", 7, 5)] }),
            )
            .await,
        )
        .await;
        let uri = format!("/api/strategies/{}", saved[0].id);

        login_test_user(&client, "bob@example.com").await;
        let response = put_json(&client, &uri, strategy("Hijacked", 1, 1)).await;
        assert_eq!(response.status(), Status::Forbidden);

        login_test_user(&client, "alice@example.com").await;
        let response = put_json(&client, &uri, strategy("Call a friend", 7, 1)).await;
        assert_eq!(response.status(), Status::Ok);
        let updated: AntiCravingStrategy = read_json(response).await;
        assert_eq!(updated.craving_after, 1);
        assert_eq!(updated.craving_reduction, 6);

        assert_eq!(
            client.delete(uri.as_str()).dispatch().await.status(),
            Status::NoContent
        );
        assert_eq!(
            client.delete(uri.as_str()).dispatch().await.status(),
            Status::NotFound
        );
    }
}
