#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const JWT_SECRET: &str = "integration-test-secret";

/// A server process with its own schema, killed on drop
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    child: Child,
}

impl TestServer {
    fn spawn(database_url: &str) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let schema = format!("filmoteka_test_{}_{}", std::process::id(), port);

        let child = Command::new(env!("CARGO_BIN_EXE_filmoteka"))
            .arg("--addr")
            .arg(format!("127.0.0.1:{}", port))
            .env("DATABASE_URL", database_url)
            .env("DATABASE_SCHEMA", &schema)
            .env("DATABASE_MAX_CONNECTIONS", "4")
            .env("JWT_SECRET_KEY", JWT_SECRET)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&self, username: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/v1/auth"))
            .json(&json!({"username": username, "password": "password"}))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

        let body: Value = res.json().await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no token")
    }

    /// POST as admin, expecting 200, returning the decoded body
    pub async fn admin_post(&self, token: &str, path: &str, body: Value) -> Result<Value> {
        let res = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "POST {} failed: {}", path, res.status());
        Ok(res.json().await?)
    }

    pub async fn get_json(&self, token: &str, path: &str) -> Result<Value> {
        let res = self.client.get(self.url(path)).bearer_auth(token).send().await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "GET {} failed: {}", path, res.status());
        Ok(res.json().await?)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Start a fresh server, or `None` when no DATABASE_URL is configured
pub async fn start_server() -> Result<Option<TestServer>> {
    let _ = dotenvy::dotenv();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database-backed test");
        return Ok(None);
    };

    let server = TestServer::spawn(&database_url)?;
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(Some(server))
}

/// IDs from an array of entities, in response order
pub fn ids(entities: &Value) -> Vec<i64> {
    entities
        .as_array()
        .map(|items| items.iter().filter_map(|e| e["id"].as_i64()).collect())
        .unwrap_or_default()
}
