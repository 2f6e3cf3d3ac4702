#![allow(dead_code)]

use anyhow::{Context, Result};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::{RequestBuilder, Response};
use serde_json::{json, Value};

use coffee_recipe_hub::app::{router, AppState};

pub const JWT_SECRET: &str = "test-secret";

/// In-process server on an ephemeral port with its own in-memory tables
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn(jwt_secret: Option<&str>) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind ephemeral port")?;
        let addr = listener.local_addr()?;
        let app = router(AppState::in_memory(jwt_secret));

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("test server stopped: {}", e);
            }
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str, body: &Value) -> RequestBuilder {
        self.client.post(self.url(path)).json(body)
    }

    pub fn put(&self, path: &str, body: &Value) -> RequestBuilder {
        self.client.put(self.url(path)).json(body)
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }
}

/// Starts a server that verifies tokens signed with `JWT_SECRET`
pub async fn ensure_server() -> Result<TestServer> {
    TestServer::spawn(Some(JWT_SECRET)).await
}

pub fn token_for(user_id: &str) -> String {
    encode(
        &Header::default(),
        &json!({ "sub": user_id, "email": format!("{}@example.com", user_id) }),
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("token encodes")
}

pub trait AsUser {
    fn as_user(self, user_id: &str) -> Self;
}

impl AsUser for RequestBuilder {
    fn as_user(self, user_id: &str) -> Self {
        self.bearer_auth(token_for(user_id))
    }
}

pub async fn json_body(response: Response) -> Result<Value> {
    response.json::<Value>().await.context("response body is not JSON")
}

/// POSTs `body` and returns the created record, asserting 201
pub async fn create(server: &TestServer, path: &str, body: Value, user: Option<&str>) -> Result<Value> {
    let mut request = server.post(path, &body);
    if let Some(user) = user {
        request = request.as_user(user);
    }
    let response = request.send().await?;
    let status = response.status();
    let body = json_body(response).await?;
    anyhow::ensure!(status == reqwest::StatusCode::CREATED, "expected 201, got {}: {}", status, body);
    Ok(body)
}

pub fn id_of(record: &Value) -> &str {
    record["id"].as_str().expect("record has an id")
}

pub fn recipe_body(title: &str, coffee_grams: f64, is_public: bool) -> Value {
    json!({
        "title": title,
        "equipment": "V60",
        "coffeeGrams": coffee_grams,
        "totalWaterMl": 250,
        "waterTemperature": 92,
        "grindSize": "MEDIUM_FINE",
        "steps": [
            { "order": 1, "label": "Bloom", "timeSeconds": 30, "waterMl": 40 },
            { "order": 2, "label": "Main pour", "timeSeconds": 90, "waterMl": 210 }
        ],
        "isPublic": is_public
    })
}
