mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use recipe_api::database::{DocumentStore, Filter};

async fn recipe_count(server: &common::TestServer) -> Result<u64> {
    Ok(server.store.count("recipes", &Filter::new()).await?)
}

#[tokio::test]
async fn omelette_lifecycle() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.signed_in("chef1", "pw123").await?;

    let created = server
        .create_recipe(&token, json!({ "name": "Omelette", "description": "eggs" }))
        .await?;
    let id = created["id"].as_str().unwrap_or_default().to_string();
    assert!(Uuid::parse_str(&id).is_ok());
    assert_eq!(created["owner"], "chef1");

    let path = format!("/recipes/{id}");
    let res = server.get(&path, &token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let fetched = res.json::<Value>().await?;
    assert_eq!(fetched["name"], "Omelette");
    assert_eq!(fetched["description"], "eggs");
    assert_eq!(fetched, created);

    let res = server.delete(&path, &token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.bytes().await?.is_empty());

    let res = server.get(&path, &token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    server.stop().await
}

#[tokio::test]
async fn create_requires_name_and_description() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.signed_in("chef1", "pw123").await?;

    for body in [
        json!({ "description": "eggs" }),
        json!({ "name": "Omelette" }),
        json!({ "name": "", "description": "eggs" }),
    ] {
        let res = server.post("/recipes", &token).json(&body).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(res.json::<Value>().await?["code"], "VALIDATION_ERROR");
    }

    assert_eq!(recipe_count(&server).await?, 0);
    server.stop().await
}

#[tokio::test]
async fn create_ignores_client_supplied_owner() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.signed_in("chef1", "pw123").await?;

    let created = server
        .create_recipe(&token, json!({ "name": "Omelette", "description": "eggs", "owner": "mallory" }))
        .await?;
    assert_eq!(created["owner"], "chef1");

    server.stop().await
}

#[tokio::test]
async fn malformed_body_is_400_without_write() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.signed_in("chef1", "pw123").await?;

    let res = server
        .post("/recipes", &token)
        .header("content-type", "application/json")
        .body("{\"name\": ")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], true);

    assert_eq!(recipe_count(&server).await?, 0);
    server.stop().await
}

#[tokio::test]
async fn writes_without_token_are_rejected() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.signed_in("chef1", "pw123").await?;
    let created = server
        .create_recipe(&token, json!({ "name": "Omelette", "description": "eggs" }))
        .await?;
    let id = created["id"].as_str().unwrap_or_default().to_string();
    let path = server.url(&format!("/recipes/{id}"));

    let res = server
        .client
        .post(server.url("/recipes"))
        .json(&json!({ "name": "Toast", "description": "bread" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .put(&path)
        .json(&json!({ "id": id, "name": "Toast" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.client.delete(&path).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(recipe_count(&server).await?, 1);
    let fetched = server.get(&format!("/recipes/{id}"), &token).send().await?.json::<Value>().await?;
    assert_eq!(fetched["name"], "Omelette");

    server.stop().await
}

#[tokio::test]
async fn reads_without_token_are_rejected() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server.client.get(server.url("/recipes")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>().await?["code"], "UNAUTHORIZED");

    server.stop().await
}

#[tokio::test]
async fn update_with_mismatched_id_is_400_without_write() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.signed_in("chef1", "pw123").await?;
    let created = server
        .create_recipe(&token, json!({ "name": "Omelette", "description": "eggs" }))
        .await?;
    let id = created["id"].as_str().unwrap_or_default().to_string();
    let path = format!("/recipes/{id}");

    let res = server
        .put(&path, &token)
        .json(&json!({ "id": Uuid::new_v4().to_string(), "name": "Toast" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .put(&path, &token)
        .json(&json!({ "name": "Toast" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let fetched = server.get(&path, &token).send().await?.json::<Value>().await?;
    assert_eq!(fetched, created);

    server.stop().await
}

#[tokio::test]
async fn update_is_sparse() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.signed_in("chef1", "pw123").await?;
    let created = server
        .create_recipe(
            &token,
            json!({ "name": "Omelette", "description": "eggs", "cuisine": "french", "servings": "2" }),
        )
        .await?;
    let id = created["id"].as_str().unwrap_or_default().to_string();
    let path = format!("/recipes/{id}");

    let res = server
        .put(&path, &token)
        .json(&json!({ "id": id, "servings": "4" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = res.json::<Value>().await?;
    assert_eq!(updated["servings"], "4");
    assert_eq!(updated["name"], "Omelette");
    assert_eq!(updated["cuisine"], "french");

    let fetched = server.get(&path, &token).send().await?.json::<Value>().await?;
    assert_eq!(fetched, updated);

    server.stop().await
}

#[tokio::test]
async fn update_of_missing_recipe_is_404() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.signed_in("chef1", "pw123").await?;

    let id = Uuid::new_v4().to_string();
    let res = server
        .put(&format!("/recipes/{id}"), &token)
        .json(&json!({ "id": id, "name": "Toast" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    server.stop().await
}

#[tokio::test]
async fn delete_of_missing_recipe_is_204() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.signed_in("chef1", "pw123").await?;

    for id in [Uuid::new_v4().to_string(), "not-an-id".to_string()] {
        let res = server.delete(&format!("/recipes/{id}"), &token).send().await?;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    server.stop().await
}

#[tokio::test]
async fn list_returns_callers_recipes_in_creation_order() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let chef1 = server.signed_in("chef1", "pw123").await?;
    let chef2 = server.signed_in("chef2", "pw123").await?;

    assert_eq!(server.get("/recipes", &chef1).send().await?.json::<Value>().await?, json!([]));

    server.create_recipe(&chef1, json!({ "name": "Omelette", "description": "eggs" })).await?;
    server.create_recipe(&chef2, json!({ "name": "Ramen", "description": "noodles" })).await?;
    server.create_recipe(&chef1, json!({ "name": "Toast", "description": "bread" })).await?;

    let listed = server.get("/recipes", &chef1).send().await?.json::<Vec<Value>>().await?;
    let names: Vec<&str> = listed.iter().filter_map(|r| r["name"].as_str()).collect();
    assert_eq!(names, ["Omelette", "Toast"]);

    server.stop().await
}

#[tokio::test]
async fn owner_listing_by_username() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let chef1 = server.signed_in("chef1", "pw123").await?;
    let chef2 = server.signed_in("chef2", "pw123").await?;
    server.create_recipe(&chef1, json!({ "name": "Omelette", "description": "eggs" })).await?;

    let own = server.get("/recipes/chef1", &chef1).send().await?;
    assert_eq!(own.status(), StatusCode::OK);
    assert_eq!(own.json::<Vec<Value>>().await?.len(), 1);

    let foreign = server.get("/recipes/chef1", &chef2).send().await?;
    assert_eq!(foreign.status(), StatusCode::OK);
    assert_eq!(foreign.json::<Value>().await?, json!([]));

    let nobody = server.get("/recipes/nobody", &chef1).send().await?;
    assert_eq!(nobody.json::<Value>().await?, json!([]));

    server.stop().await
}

#[tokio::test]
async fn recipes_are_private_to_their_owner() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let chef1 = server.signed_in("chef1", "pw123").await?;
    let chef2 = server.signed_in("chef2", "pw123").await?;
    let created = server
        .create_recipe(&chef1, json!({ "name": "Omelette", "description": "eggs" }))
        .await?;
    let id = created["id"].as_str().unwrap_or_default().to_string();
    let path = format!("/recipes/{id}");

    let res = server.get(&path, &chef2).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server
        .put(&path, &chef2)
        .json(&json!({ "id": id, "name": "Stolen" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.delete(&path, &chef2).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let fetched = server.get(&path, &chef1).send().await?.json::<Value>().await?;
    assert_eq!(fetched, created);

    server.stop().await
}
