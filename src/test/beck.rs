#[cfg(test)]
mod tests {
    use crate::models::BeckAnalysis;
    use crate::test::test_client::{login_test_user, post_json, read_json, setup_test_client};
    use crate::test::test_db::create_standard_test_db;
    use rocket::http::Status;
    use serde_json::{Value, json};

    fn worksheet() -> Value {
        json!({
            "situation": "Walked past my old bar",
            "automatic_thoughts": "One drink will not hurt",
            "emotions": "craving, nostalgia",
            "emotion_intensity": 8,
            "rational_response": "One drink has never stayed one drink",
            "new_feeling": "determined",
            "new_intensity": 4
        })
    }

    #[rocket::async_test]
    async fn test_create_and_read_beck_analysis() {
        let (client, _db) = setup_test_client(create_standard_test_db().await).await;
        login_test_user(&client, "alice@example.com").await;

        let response = post_json(&client, "/api/beck-analyses", worksheet()).await;
        assert_eq!(response.status(), Status::Created);
        let created: BeckAnalysis = read_json(response).await;
        assert_eq!(created.emotion_intensity, Some(8));
        assert_eq!(created.new_intensity, Some(4));

        let list: Vec<BeckAnalysis> =
            read_json(client.get("/api/beck-analyses").dispatch().await).await;
        assert_eq!(list.len(), 1);

        let uri = format!("/api/beck-analyses/{}", created.id);
        let fetched: BeckAnalysis = read_json(client.get(uri.as_str()).dispatch().await).await;
        assert_eq!(fetched.situation, "Walked past my old bar");
    }

    #[rocket::async_test]
    async fn test_beck_analysis_validation() {
        let (client, _db) = setup_test_client(create_standard_test_db().await).await;
        login_test_user(&client, "alice@example.com").await;

        let mut body = worksheet();
        body["situation"] = json!("");
        body["new_intensity"] = json!(12);

        let response = post_json(&client, "/api/beck-analyses", body).await;
        assert_eq!(response.status(), Status::BadRequest);

        let errors: Value = read_json(response).await;
        assert!(errors["errors"]["situation"].is_array());
        assert!(errors["errors"]["new_intensity"].is_array());
    }

    #[rocket::async_test]
    async fn test_beck_analysis_access_rules() {
        let (client, _db) = setup_test_client(create_standard_test_db().await).await;
        login_test_user(&client, "alice@example.com").await;

        let created: BeckAnalysis =
            read_json(post_json(&client, "/api/beck-analyses", worksheet()).await).await;
        let uri = format!("/api/beck-analyses/{}", created.id);

        login_test_user(&client, "bob@example.com").await;
        assert_eq!(client.get(uri.as_str()).dispatch().await.status(), Status::Forbidden);
        assert_eq!(
            client.delete(uri.as_str()).dispatch().await.status(),
            Status::Forbidden
        );

        // The therapist may read the worksheet but not delete it.
        login_test_user(&client, "therapist@example.com").await;
        assert_eq!(client.get(uri.as_str()).dispatch().await.status(), Status::Ok);
        assert_eq!(
            client.delete(uri.as_str()).dispatch().await.status(),
            Status::Forbidden
        );

        login_test_user(&client, "alice@example.com").await;
        assert_eq!(
            client.delete(uri.as_str()).dispatch().await.status(),
            Status::NoContent
        );
        assert_eq!(client.get(uri.as_str()).dispatch().await.status(), Status::NotFound);
    }
}
