#[cfg(test)]
mod tests {
    use crate::test::test_client::{
        login_test_user, post_json, put_json, read_json, setup_test_client,
    };
    use crate::test::test_db::create_standard_test_db;
    use rocket::http::{Cookie, Status};
    use serde_json::{Value, json};

    #[rocket::async_test]
    async fn test_register_opens_a_session() {
        let (client, _db) = setup_test_client(create_standard_test_db().await).await;

        let response = post_json(
            &client,
            "/api/auth/register",
            json!({
                "email": "New.Patient@Example.com",
                "password": "longenough",
                "first_name": "Nina",
                "last_name": "Patient"
            }),
        )
        .await;
        assert_eq!(response.status(), Status::Created);

        let me: Value = read_json(client.get("/api/auth/me").dispatch().await).await;
        assert_eq!(me["email"], "new.patient@example.com");
        assert_eq!(me["role"], "patient");
        assert_eq!(me["level"], 1);
        assert_eq!(me["points"], 0);
    }

    #[rocket::async_test]
    async fn test_register_rejects_duplicates_and_bad_input() {
        let (client, _db) = setup_test_client(create_standard_test_db().await).await;

        let response = post_json(
            &client,
            "/api/auth/register",
            json!({
                "email": "alice@example.com",
                "password": "longenough",
                "first_name": "Alice",
                "last_name": "Again"
            }),
        )
        .await;
        assert_eq!(response.status(), Status::BadRequest);

        let response = post_json(
            &client,
            "/api/auth/register",
            json!({
                "email": "not-an-email",
                "password": "short",
                "first_name": "",
                "last_name": "X"
            }),
        )
        .await;
        assert_eq!(response.status(), Status::BadRequest);

        let body: Value = read_json(response).await;
        let errors = body["errors"].as_object().expect("Field errors missing");
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("password"));
        assert!(errors.contains_key("first_name"));
    }

    #[rocket::async_test]
    async fn test_login_and_logout() {
        let (client, _db) = setup_test_client(create_standard_test_db().await).await;

        let response = post_json(
            &client,
            "/api/auth/login",
            json!({ "email": "alice@example.com", "password": "wrong_password" }),
        )
        .await;
        assert_eq!(response.status(), Status::Unauthorized);
        let body: Value = read_json(response).await;
        assert_eq!(body["message"], "Invalid email or password");

        assert_eq!(login_test_user(&client, "alice@example.com").await, Status::Ok);
        assert_eq!(client.get("/api/auth/me").dispatch().await.status(), Status::Ok);

        let response = client.post("/api/auth/logout").dispatch().await;
        assert_eq!(response.status(), Status::NoContent);

        assert_eq!(
            client.get("/api/auth/me").dispatch().await.status(),
            Status::Unauthorized
        );
    }

    #[rocket::async_test]
    async fn test_auth_required_apis() {
        let (client, _db) = setup_test_client(create_standard_test_db().await).await;

        let endpoints = vec![
            "/api/auth/me",
            "/api/cravings",
            "/api/beck-analyses",
            "/api/strategies",
            "/api/exercises",
            "/api/sessions",
            "/api/patient-sessions",
            "/api/dashboard",
            "/api/admin/users",
        ];

        for endpoint in endpoints {
            let response = client.get(endpoint).dispatch().await;
            assert_eq!(
                response.status(),
                Status::Unauthorized,
                "Endpoint {} did not require authentication",
                endpoint
            );
            let body: Value = read_json(response).await;
            assert_eq!(body["message"], "Authentication required");
        }

        assert_eq!(client.get("/api/health").dispatch().await.status(), Status::Ok);
    }

    #[rocket::async_test]
    async fn test_forged_session_token_is_rejected() {
        let (client, _db) = setup_test_client(create_standard_test_db().await).await;

        let forged_cookie = Cookie::build(("session_token", "fake_token")).build();

        let response = client
            .get("/api/auth/me")
            .private_cookie(forged_cookie)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn test_update_profile_and_change_password() {
        let (client, _db) = setup_test_client(create_standard_test_db().await).await;
        login_test_user(&client, "alice@example.com").await;

        let response = put_json(
            &client,
            "/api/auth/profile",
            json!({ "first_name": " Alicia ", "last_name": "Smith" }),
        )
        .await;
        assert_eq!(response.status(), Status::Ok);
        let me: Value = read_json(response).await;
        assert_eq!(me["first_name"], "Alicia");

        let response = post_json(
            &client,
            "/api/auth/change-password",
            json!({ "current_password": "not-it", "new_password": "a-new-password" }),
        )
        .await;
        assert_eq!(response.status(), Status::BadRequest);

        let response = post_json(
            &client,
            "/api/auth/change-password",
            json!({ "current_password": "password123", "new_password": "a-new-password" }),
        )
        .await;
        assert_eq!(response.status(), Status::NoContent);

        // The session was reopened for this client.
        assert_eq!(client.get("/api/auth/me").dispatch().await.status(), Status::Ok);

        assert_eq!(
            login_test_user(&client, "alice@example.com").await,
            Status::Unauthorized
        );
        let response = post_json(
            &client,
            "/api/auth/login",
            json!({ "email": "alice@example.com", "password": "a-new-password" }),
        )
        .await;
        assert_eq!(response.status(), Status::Ok);
    }

    #[rocket::async_test]
    async fn test_user_administration() {
        let (client, db) = setup_test_client(create_standard_test_db().await).await;
        let bob = db.user_id("bob@example.com").expect("bob missing");
        let therapist = db.user_id("therapist@example.com").expect("therapist missing");

        login_test_user(&client, "alice@example.com").await;
        assert_eq!(
            client.get("/api/admin/users").dispatch().await.status(),
            Status::Forbidden
        );

        login_test_user(&client, "therapist@example.com").await;
        let users: Vec<Value> = read_json(client.get("/api/admin/users").dispatch().await).await;
        assert_eq!(users.len(), 3);

        let patients: Vec<Value> =
            read_json(client.get("/api/admin/users?role=patient").dispatch().await).await;
        assert_eq!(patients.len(), 2);

        let response = post_json(
            &client,
            "/api/admin/users",
            json!({
                "email": "second.therapist@example.com",
                "password": "password123",
                "first_name": "Tara",
                "role": "admin"
            }),
        )
        .await;
        assert_eq!(response.status(), Status::Created);

        let uri = format!("/api/admin/users/{}", therapist);
        let response = client.delete(uri.as_str()).dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);

        let uri = format!("/api/admin/users/{}", bob);
        let response = put_json(&client, &uri, json!({ "is_active": false })).await;
        assert_eq!(response.status(), Status::Ok);
        let updated: Value = read_json(response).await;
        assert_eq!(updated["is_active"], false);

        assert_eq!(
            login_test_user(&client, "bob@example.com").await,
            Status::Unauthorized
        );

        login_test_user(&client, "therapist@example.com").await;
        let response = client.delete(uri.as_str()).dispatch().await;
        assert_eq!(response.status(), Status::NoContent);

        let response = client.delete(uri.as_str()).dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
    }
}
