mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn register_returns_user_without_password() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server.register("chef1", "pw123").await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = res.json::<Value>().await?;
    assert_eq!(body, json!({ "username": "chef1", "firstName": "Test", "lastName": "Cook" }));

    server.stop().await
}

#[tokio::test]
async fn duplicate_username_is_conflict() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    server.register("chef1", "pw123").await?;
    let res = server.register("chef1", "different").await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    server.stop().await
}

#[tokio::test]
async fn register_rejects_policy_failures() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    for (username, password) in [("ab", "pw123"), ("chef one", "pw123"), ("chef1", ""), ("chef1", " pw123")] {
        let res = server.register(username, password).await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{username:?}/{password:?}");
    }

    let res = server
        .client
        .post(server.url("/users"))
        .json(&json!({ "username": "chef1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    server.stop().await
}

#[tokio::test]
async fn malformed_json_is_400_json() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server
        .client
        .post(server.url("/users"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "INVALID_JSON");

    server.stop().await
}

#[tokio::test]
async fn login_issues_bearer_token() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    server.register("chef1", "pw123").await?;

    let res = server.login("chef1", "pw123").await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["tokenType"], "Bearer");
    assert!(body["authToken"].as_str().is_some_and(|t| t.split('.').count() == 3));
    assert!(body["expiresAt"].is_string());

    server.stop().await
}

#[tokio::test]
async fn bad_credentials_do_not_reveal_which_part_failed() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    server.register("chef1", "pw123").await?;

    let wrong_password = server.login("chef1", "nope").await?;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = wrong_password.json::<Value>().await?;

    let unknown_user = server.login("nobody", "pw123").await?;
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let unknown_user = unknown_user.json::<Value>().await?;

    assert_eq!(wrong_password, unknown_user);

    server.stop().await
}

#[tokio::test]
async fn protected_routes_reject_bad_tokens() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server.client.get(server.url("/users/me")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.get("/users/me", "not-a-token").send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .get(server.url("/users/me"))
        .header("authorization", "Basic Zm9vOmJhcg==")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    server.stop().await
}

#[tokio::test]
async fn refresh_issues_working_token() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.signed_in("chef1", "pw123").await?;

    let res = server.post("/auth/refresh", &token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let refreshed = res.json::<Value>().await?["authToken"].as_str().unwrap_or_default().to_string();

    let res = server.get("/users/me", &refreshed).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    server.stop().await
}

#[tokio::test]
async fn profile_read_and_update() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.signed_in("chef1", "pw123").await?;

    let me = server.get("/users/me", &token).send().await?.json::<Value>().await?;
    assert_eq!(me["username"], "chef1");

    let res = server
        .put("/users/me", &token)
        .json(&json!({ "lastName": "Child" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let me = res.json::<Value>().await?;
    assert_eq!(me["firstName"], "Test");
    assert_eq!(me["lastName"], "Child");

    server.stop().await
}

#[tokio::test]
async fn password_change_flow() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.signed_in("chef1", "pw123").await?;

    let res = server
        .put("/users/me/password", &token)
        .json(&json!({ "currentPassword": "wrong", "newPassword": "newpass" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .put("/users/me/password", &token)
        .json(&json!({ "currentPassword": "pw123" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .put("/users/me/password", &token)
        .json(&json!({ "currentPassword": "pw123", "newPassword": "newpass" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    assert_eq!(server.login("chef1", "pw123").await?.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(server.login("chef1", "newpass").await?.status(), StatusCode::OK);

    server.stop().await
}

#[tokio::test]
async fn account_deletion_removes_user_and_recipes() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.signed_in("chef1", "pw123").await?;
    server
        .create_recipe(&token, json!({ "name": "Omelette", "description": "eggs" }))
        .await?;

    let res = server.delete("/users/me", &token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    assert_eq!(server.login("chef1", "pw123").await?.status(), StatusCode::UNAUTHORIZED);

    // The token is still signed and unexpired, but nothing is left to see
    let recipes = server.get("/recipes", &token).send().await?.json::<Value>().await?;
    assert_eq!(recipes, json!([]));

    server.stop().await
}
