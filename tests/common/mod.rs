use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/weblog-api");
        cmd.env("WEBLOG_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Tokens issued and verified within the suite need a stable secret
        if std::env::var("JWT_SECRET_KEY").is_err() {
            cmd.env("JWT_SECRET_KEY", "weblog-test-secret");
        }

        // Inherit environment so the server sees DATABASE_URL from .env
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/healthcheck", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// CRUD suites need a live store; they skip themselves when none is configured.
#[allow(dead_code)]
pub fn database_available() -> bool {
    std::env::var("DATABASE_URL").is_ok()
        || (std::env::var("DATABASE_USERNAME").is_ok() && std::env::var("DATABASE_NAME").is_ok())
}

/// Unique suffix so repeated runs never trip the store's uniqueness constraints.
#[allow(dead_code)]
pub fn unique_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{}_{}", std::process::id(), nanos)
}

/// Register a fresh user and return (token, user_id, username).
#[allow(dead_code)]
pub async fn register_and_login(base_url: &str) -> Result<(String, i64, String)> {
    let client = reqwest::Client::new();
    let username = format!("user_{}", common_suffix_short());
    let password = "correct horse battery staple";

    let res = client
        .post(format!("{}/users/auth/register", base_url))
        .json(&serde_json::json!({
            "email": format!("{}@example.com", username),
            "username": username,
            "password": password,
        }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "register failed: {}",
        res.status()
    );
    let body = res.json::<serde_json::Value>().await?;
    let user_id = body["data"]["id"].as_i64().context("missing user id")?;

    let res = client
        .post(format!("{}/users/auth/jwt/login", base_url))
        .json(&serde_json::json!({
            "username": username,
            "password": password,
        }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::OK,
        "login failed: {}",
        res.status()
    );
    let body = res.json::<serde_json::Value>().await?;
    let token = body["data"]["access_token"]
        .as_str()
        .context("missing access_token")?
        .to_string();

    Ok((token, user_id, username))
}

#[allow(dead_code)]
fn common_suffix_short() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    // Usernames are capped at 50 chars; keep the suffix compact
    format!("{:x}", nanos % 0xffff_ffff_ffff)
}
