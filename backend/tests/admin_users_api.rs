use axum::http::StatusCode;
use serde_json::json;

mod support;

use support::{
    admin_token, login, login_tokens, memory_app, refresh, register, seed_user, send,
    TEST_ADMIN_ROLE_LABEL,
};

#[tokio::test]
async fn non_admin_is_rejected_from_admin_routes() {
    let app = memory_app().await;
    register(&app.router, "learner", "password123").await;
    let (token, _) = login_tokens(&app.router, "learner", "password123").await;

    for (method, uri) in [
        ("GET", "/api/users"),
        ("GET", "/api/users/options"),
        ("POST", "/api/users"),
        ("PATCH", "/api/users/learner"),
        ("POST", "/api/users/learner/reset-password"),
    ] {
        let (status, body) =
            send(&app.router, method, uri, Some(&token), Some(json!({}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{method} {uri}");
        assert_eq!(body["error"], "admin only");
    }

    let (status, _) = send(&app.router, "GET", "/api/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_role_is_matched_case_insensitively_or_by_localized_label() {
    let app = memory_app().await;
    seed_user(&app.store, "shouty", "password123", "ADMIN").await;
    seed_user(&app.store, "localized", "password123", TEST_ADMIN_ROLE_LABEL).await;
    seed_user(&app.store, "instructor", "password123", "ผู้สอน").await;

    for username in ["shouty", "localized"] {
        let (token, _) = login_tokens(&app.router, username, "password123").await;
        let (status, body) = send(&app.router, "GET", "/api/users", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK, "{username}");
        assert_eq!(body["users"].as_array().unwrap().len(), 4);
    }

    let (token, _) = login_tokens(&app.router, "instructor", "password123").await;
    let (status, _) = send(&app.router, "GET", "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn default_admin_bootstrap_is_idempotent() {
    let app = memory_app().await;
    let created = app
        .state
        .accounts
        .ensure_default_admin("Root Admin", "ROOT", "another-password")
        .await
        .unwrap();
    assert!(!created);

    let root = app.store.user("root").unwrap();
    assert_eq!(root.role, "admin");

    // The first password still works.
    admin_token(&app.router).await;
}

#[tokio::test]
async fn admin_creates_lists_and_updates_users() {
    let app = memory_app().await;
    let token = admin_token(&app.router).await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({
            "name": "New Hire",
            "username": " Hire ",
            "employee_code": " 2026-hr-0001 ",
            "password": "password123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "create user success");
    assert_eq!(body["user"]["username"], "hire");
    assert_eq!(body["user"]["employee_code"], "2026-HR-0001");
    assert_eq!(body["user"]["role"], "ผู้ใช้งาน");
    assert_eq!(body["user"]["status"], "active");

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({
            "name": "Bad Role",
            "username": "badrole",
            "employee_code": "2026-HR-0002",
            "password": "password123",
            "role": "superuser",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app.router,
        "PATCH",
        "/api/users/hire",
        Some(&token),
        Some(json!({ "role": "ผู้สอน", "name": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "update user success");
    assert_eq!(body["user"]["role"], "ผู้สอน");
    assert_eq!(body["user"]["name"], "New Hire");
    assert_eq!(body["user"]["employee_code"], "2026-HR-0001");

    let (status, body) = send(
        &app.router,
        "PATCH",
        "/api/users/hire",
        Some(&token),
        Some(json!({ "employee_code": "2026-it-0009" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["employee_code"], "2026-IT-0009");

    let (status, body) = send(
        &app.router,
        "PATCH",
        "/api/users/hire",
        Some(&token),
        Some(json!({ "employee_code": "IT-9" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["errors"], json!(["employee_code must be in format 2026-XX-XXXX"]));

    let (status, body) = send(
        &app.router,
        "PATCH",
        "/api/users/hire",
        Some(&token),
        Some(json!({ "status": "paused" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &app.router,
        "PATCH",
        "/api/users/ghost",
        Some(&token),
        Some(json!({ "name": "Ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app.router, "GET", "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let usernames: Vec<&str> = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|user| user["username"].as_str().unwrap())
        .collect();
    assert_eq!(usernames, vec!["hire", "root"]);
}

#[tokio::test]
async fn admin_create_requires_a_valid_employee_code() {
    let app = memory_app().await;
    let token = admin_token(&app.router).await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({ "name": "No Code", "username": "nocode", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(
        body["details"]["errors"],
        json!(["name, username, employee_code and password are required"])
    );

    for code in ["2025-HR-0001", "2026-HR-001", "2026_HR_0001"] {
        let (status, body) = send(
            &app.router,
            "POST",
            "/api/users",
            Some(&token),
            Some(json!({
                "name": "Bad Code",
                "username": "badcode",
                "employee_code": code,
                "password": "password123",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{code}");
        assert_eq!(
            body["details"]["errors"],
            json!(["employee_code must be in format 2026-XX-XXXX"]),
            "{code}"
        );
    }
    assert!(app.store.user("nocode").is_none());
    assert!(app.store.user("badcode").is_none());

    // Self-registered accounts carry no code.
    let body = register(&app.router, "walkin", "password123").await;
    assert_eq!(body["user"]["employee_code"], "");
}

#[tokio::test]
async fn deactivating_a_user_blocks_their_sessions() {
    let app = memory_app().await;
    let token = admin_token(&app.router).await;
    register(&app.router, "leaver", "password123").await;
    let (_, refresh_token) = login_tokens(&app.router, "leaver", "password123").await;

    let (status, body) = send(
        &app.router,
        "PATCH",
        "/api/users/leaver",
        Some(&token),
        Some(json!({ "status": "Inactive" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["status"], "inactive");

    let (status, body) = refresh(&app.router, &refresh_token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "ACCOUNT_INACTIVE");
    let (status, _) = login(&app.router, "leaver", "password123").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_reset_password_revokes_refresh_tokens() {
    let app = memory_app().await;
    let token = admin_token(&app.router).await;
    register(&app.router, "forgetful", "password123").await;
    let (_, first) = login_tokens(&app.router, "forgetful", "password123").await;
    let (_, second) = login_tokens(&app.router, "forgetful", "password123").await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/users/forgetful/reset-password",
        Some(&token),
        Some(json!({ "new_password": "brand-new-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "reset password success");

    for refresh_token in [first, second] {
        let (status, _) = refresh(&app.router, &refresh_token).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (status, _) = login(&app.router, "forgetful", "password123").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    login_tokens(&app.router, "forgetful", "brand-new-pass").await;

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/users/nobody/reset-password",
        Some(&token),
        Some(json!({ "new_password": "brand-new-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/users/forgetful/reset-password",
        Some(&token),
        Some(json!({ "new_password": "tiny" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn option_lists_are_served() {
    let app = memory_app().await;
    let token = admin_token(&app.router).await;

    let (status, body) = send(&app.router, "GET", "/api/users/options", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["default_role"], "ผู้ใช้งาน");
    assert_eq!(body["default_status"], "active");
    assert_eq!(body["status_options"], json!(["active", "inactive"]));
    assert_eq!(body["role_options"].as_array().unwrap().len(), 5);

    register(&app.router, "viewer", "password123").await;
    let (token, _) = login_tokens(&app.router, "viewer", "password123").await;
    let (status, body) = send(&app.router, "GET", "/api/role", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["default_role"], "ผู้ใช้งาน");
    assert_eq!(body["roles"].as_array().unwrap().len(), 5);
}
