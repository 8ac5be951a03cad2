use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use sqlx::Executor;
use tokio::sync::OnceCell;

static SERVER: OnceCell<TestServer> = OnceCell::const_new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn(database_url: &str) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_catalog-api"));
        cmd.args(["--port", &port.to_string(), "--db-dsn", database_url])
            // The suite fires requests back to back from one address.
            .args(["--limiter-enabled", "false"])
            .env("RUST_LOG", "catalog_api=warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/v1/healthcheck", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
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

    pub fn pid(&self) -> u32 {
        self.child.id()
    }
}

/// DATABASE_URL for the end-to-end suite, or `None` to skip it.
pub fn database_url() -> Option<String> {
    let _ = dotenvy::dotenv();
    std::env::var("DATABASE_URL").ok().filter(|url| !url.is_empty())
}

/// Create the tables the server expects.
pub async fn apply_schema(database_url: &str) -> Result<()> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(1)
        .connect(database_url)
        .await
        .context("failed to connect for schema setup")?;
    pool.execute(include_str!("../../sql/schema.sql"))
        .await
        .context("failed to apply sql/schema.sql")?;
    pool.close().await;
    Ok(())
}

pub async fn ensure_server(database_url: &str) -> Result<&'static TestServer> {
    let server = SERVER
        .get_or_try_init(|| async {
            apply_schema(database_url).await?;
            TestServer::spawn(database_url)
        })
        .await?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}
