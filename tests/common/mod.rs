#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};

use recipe_api::config::AppConfig;
use recipe_api::database::{MemoryStore, SharedStore};
use recipe_api::ServerHandle;

pub struct TestServer {
    pub base_url: String,
    pub store: SharedStore,
    pub client: Client,
    handle: ServerHandle,
}

impl TestServer {
    /// Start a server on a free port over a fresh in-memory store
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;

        let mut config = AppConfig::development();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = port;
        config.database.url = "memory://".to_string();
        config.security.jwt_secret = "integration-test-secret".to_string();

        let store: SharedStore = Arc::new(MemoryStore::new());
        let handle = recipe_api::start(config, store.clone()).await?;

        Ok(Self {
            base_url: format!("http://{}", handle.local_addr()),
            store,
            client: Client::new(),
            handle,
        })
    }

    pub async fn stop(self) -> Result<()> {
        self.handle.stop().await
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token)
    }

    pub fn put(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/users"))
            .json(&json!({
                "username": username,
                "password": password,
                "firstName": "Test",
                "lastName": "Cook"
            }))
            .send()
            .await?)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?)
    }

    /// Register and log in, returning the bearer token
    pub async fn signed_in(&self, username: &str, password: &str) -> Result<String> {
        let res = self.register(username, password).await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

        let res = self.login(username, password).await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

        let body = res.json::<Value>().await?;
        body["authToken"]
            .as_str()
            .map(str::to_string)
            .context("login response missing authToken")
    }

    /// Create a recipe and return the response body
    pub async fn create_recipe(&self, token: &str, recipe: Value) -> Result<Value> {
        let res = self.post("/recipes", token).json(&recipe).send().await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());
        Ok(res.json::<Value>().await?)
    }
}
