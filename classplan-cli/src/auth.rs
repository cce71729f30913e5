//! Google OAuth for Classroom + Drive (installed-app flow).
//!
//! The client secret lives at `<home>/credentials.json` in the format the
//! Google Cloud Console downloads. Tokens are cached next to it and refreshed
//! by yup-oauth2 on later runs.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;
use yup_oauth2::{InstalledFlowAuthenticator, InstalledFlowReturnMethod};

use crate::config::Config;
use crate::state::{ensure_classplan_home, home_relative};

/// Bypasses the OAuth flow when set (e.g. a token minted elsewhere).
pub const ACCESS_TOKEN_ENV: &str = "CLASSPLAN_ACCESS_TOKEN";

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/classroom.courses",
    "https://www.googleapis.com/auth/classroom.topics",
    "https://www.googleapis.com/auth/classroom.coursework.students",
    "https://www.googleapis.com/auth/classroom.courseworkmaterials",
    "https://www.googleapis.com/auth/classroom.coursework.me",
    "https://www.googleapis.com/auth/drive.readonly",
];

/// `{"installed": {...}}`, as downloaded from the Cloud Console.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ClientSecretFile {
    installed: InstalledClient,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InstalledClient {
    client_id: String,
    client_secret: String,
    auth_uri: String,
    token_uri: String,
    redirect_uris: Vec<String>,
}

fn credentials_path(cfg: &Config) -> Result<PathBuf> {
    Ok(home_relative(
        &ensure_classplan_home()?,
        &cfg.google.credentials_file,
    ))
}

fn token_cache_path(cfg: &Config) -> Result<PathBuf> {
    Ok(home_relative(
        &ensure_classplan_home()?,
        &cfg.google.token_cache_file,
    ))
}

/// Bearer token for the Classroom and Drive APIs.
///
/// Runs the browser flow on first use; afterwards the cached refresh token
/// is used silently.
pub async fn access_token(cfg: &Config) -> Result<String> {
    if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
        if !token.trim().is_empty() {
            debug!("using access token from {ACCESS_TOKEN_ENV}");
            return Ok(token.trim().to_string());
        }
    }

    let secret_path = credentials_path(cfg)?;
    if !secret_path.exists() {
        bail!(
            "Missing Google OAuth client secret at {}. Run: classplan auth",
            secret_path.display()
        );
    }

    let secret = yup_oauth2::read_application_secret(&secret_path)
        .await
        .with_context(|| format!("read {}", secret_path.display()))?;

    let auth = InstalledFlowAuthenticator::builder(secret, InstalledFlowReturnMethod::HTTPRedirect)
        .persist_tokens_to_disk(token_cache_path(cfg)?)
        .build()
        .await
        .context("building oauth authenticator")?;

    let token = auth
        .token(SCOPES)
        .await
        .context("fetching Google access token")?;

    token
        .token()
        .map(str::to_string)
        .context("OAuth flow returned no access token")
}

/// Interactive connect:
/// - if no client secret is on disk, the user pastes client_id/client_secret
///   from the Cloud Console (Desktop app)
/// - we run the installed-app flow and cache the token
pub async fn connect_interactive(cfg: &Config) -> Result<()> {
    let secret_path = credentials_path(cfg)?;

    if !secret_path.exists() {
        println!("Google Classroom connect\n");
        println!("You need OAuth credentials once:\n");
        println!("1) Go to: https://console.cloud.google.com/apis/credentials");
        println!("2) Enable the Classroom and Drive APIs for the project");
        println!("3) Create credentials → OAuth client ID → Desktop app");
        println!("4) Copy client_id + client_secret\n");

        let client_id = prompt("Paste client_id")?;
        let client_secret = prompt("Paste client_secret")?;
        if !client_id.contains('.') || client_secret.len() < 10 {
            bail!("client_id/client_secret didn't look valid");
        }

        let file = ClientSecretFile {
            installed: InstalledClient {
                client_id,
                client_secret,
                auth_uri: "https://accounts.google.com/o/oauth2/auth".to_string(),
                token_uri: "https://oauth2.googleapis.com/token".to_string(),
                redirect_uris: vec!["http://localhost".to_string()],
            },
        };
        fs::write(&secret_path, serde_json::to_string_pretty(&file)?)
            .with_context(|| format!("write {}", secret_path.display()))?;
    }

    access_token(cfg).await?;
    println!(
        "\nConnected. Tokens cached at: {}",
        token_cache_path(cfg)?.display()
    );
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}
