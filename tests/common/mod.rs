#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use eshop_api::config::AppConfig;
use eshop_api::database::{manager, MemoryStore, PgStore, Store};
use eshop_api::{router, AppState};

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: Client,
}

/// A registered user and the access token issued at login
pub struct Session {
    pub user_id: String,
    pub token: String,
}

impl TestServer {
    /// Serve the app on a free port, backed by a fresh in-memory store
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(AppConfig::development(), Arc::new(MemoryStore::new())).await
    }

    /// Serve the app against the database named by `DATABASE_URL`, migrated first.
    /// `None` when the variable is unset.
    pub async fn spawn_postgres() -> Result<Option<Self>> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping PostgreSQL test");
            return Ok(None);
        };

        let mut config = AppConfig::development();
        config.database.url = Some(url);
        let pool = manager::connect(&config.database)?;
        manager::migrate(&pool).await?;

        Ok(Some(Self::spawn_with(config, Arc::new(PgStore::new(pool))).await?))
    }

    async fn spawn_with<S: Store + 'static>(mut config: AppConfig, store: Arc<S>) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        config.server.port = port;
        config.storage.upload_dir = std::env::temp_dir()
            .join(format!("eshop-api-test-{}", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .into_owned();

        let state = AppState::new(config, store)?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router(state)).await;
        });

        let server = Self {
            port,
            base_url,
            client: Client::new(),
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register `username` and log in
    pub async fn session(&self, username: &str) -> Result<Session> {
        let resp = self
            .client
            .post(self.url("/users"))
            .json(&json!({ "username": username, "password": "secret", "fullname": "Test User" }))
            .send()
            .await?;
        anyhow::ensure!(resp.status() == StatusCode::CREATED, "register failed: {}", resp.status());
        let body: Value = resp.json().await?;
        let user_id = body["data"]["userId"].as_str().context("missing userId")?.to_string();

        let resp = self
            .client
            .post(self.url("/authentications"))
            .json(&json!({ "username": username, "password": "secret" }))
            .send()
            .await?;
        anyhow::ensure!(resp.status() == StatusCode::CREATED, "login failed: {}", resp.status());
        let body: Value = resp.json().await?;
        let token = body["data"]["accessToken"]
            .as_str()
            .context("missing accessToken")?
            .to_string();

        Ok(Session { user_id, token })
    }

    /// Create a product as `session` and return its id
    pub async fn create_product(&self, session: &Session, title: &str, price: u64) -> Result<String> {
        let resp = self
            .client
            .post(self.url("/products"))
            .bearer_auth(&session.token)
            .json(&json!({ "title": title, "price": price }))
            .send()
            .await?;
        anyhow::ensure!(resp.status() == StatusCode::CREATED, "create product failed: {}", resp.status());
        let body: Value = resp.json().await?;
        Ok(body["data"]["productId"].as_str().context("missing productId")?.to_string())
    }

    /// Open the caller's cart and return its id
    pub async fn open_cart(&self, session: &Session) -> Result<String> {
        let resp = self
            .client
            .post(self.url("/carts"))
            .bearer_auth(&session.token)
            .send()
            .await?;
        anyhow::ensure!(resp.status() == StatusCode::CREATED, "open cart failed: {}", resp.status());
        let body: Value = resp.json().await?;
        Ok(body["data"]["cartId"].as_str().context("missing cartId")?.to_string())
    }
}
