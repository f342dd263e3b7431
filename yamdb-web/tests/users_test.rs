//! Account administration and the self-service profile

mod helpers;

use helpers::{spawn_app, TestUser, ADMIN_USERNAME};
use serde_json::{json, Value};

#[tokio::test]
async fn admins_manage_accounts() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let user = TestUser::generate();

    let response = app
        .post(
            "/api/v1/users",
            Some(&admin),
            &json!({
                "username": user.username,
                "email": user.email,
                "first_name": "Ada",
                "role": "moderator"
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["role"], "moderator");
    assert_eq!(created["first_name"], "Ada");
    assert_eq!(created["bio"], "");

    let path = format!("/api/v1/users/{}", user.username);
    let response = app
        .patch(&path, Some(&admin), &json!({ "role": "admin", "bio": "Critic" }))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["role"], "admin");
    assert_eq!(updated["bio"], "Critic");

    let response = app
        .get(&format!("/api/v1/users?search={}", &user.username[..6]), Some(&admin))
        .await;
    let found: Value = response.json().await.unwrap();
    assert!(found
        .as_array()
        .unwrap()
        .iter()
        .any(|u| u["username"] == user.username.as_str()));

    let response = app.delete(&path, Some(&admin)).await;
    assert_eq!(response.status().as_u16(), 204);
    let response = app.get(&path, Some(&admin)).await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn non_admins_cannot_list_users() {
    let app = spawn_app().await;
    let (_, user) = app.user_with_role("user").await;
    let (_, moderator) = app.user_with_role("moderator").await;

    let response = app.get("/api/v1/users", None).await;
    assert_eq!(response.status().as_u16(), 401);

    let response = app.get("/api/v1/users", Some(&user)).await;
    assert_eq!(response.status().as_u16(), 403);

    let response = app.get("/api/v1/users", Some(&moderator)).await;
    assert_eq!(response.status().as_u16(), 403);

    let response = app
        .get(&format!("/api/v1/users/{}", ADMIN_USERNAME), Some(&user))
        .await;
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn profile_edits_never_change_role() {
    let app = spawn_app().await;
    let (user, token) = app.user_with_role("user").await;

    let response = app
        .patch(
            "/api/v1/users/me",
            Some(&token),
            &json!({ "role": "admin", "last_name": "Lovelace" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let me: Value = response.json().await.unwrap();
    assert_eq!(me["role"], "user");
    assert_eq!(me["last_name"], "Lovelace");
    assert_eq!(me["username"], user.username.as_str());

    let response = app.get("/api/v1/users", Some(&token)).await;
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn duplicate_accounts_are_rejected() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let response = app
        .post(
            "/api/v1/users",
            Some(&admin),
            &json!({ "username": ADMIN_USERNAME, "email": "fresh@example.com" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["fields"]["username"].is_array());

    let response = app
        .post(
            "/api/v1/users",
            Some(&admin),
            &json!({ "username": "me", "email": "me@example.com" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);
}
