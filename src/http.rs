// Shared HTTP client for fetching release artifacts

use anyhow::Result;
use reqwest::header::USER_AGENT as USER_AGENT_HEADER;
use reqwest::{Client, Response, StatusCode};

/// User-Agent used when the configuration does not override it
const USER_AGENT: &str = concat!("updraft/", env!("CARGO_PKG_VERSION"));

lazy_static::lazy_static! {
    static ref CLIENT: Client = Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_default();
}

/// Download an artifact into memory
pub async fn fetch_bytes(url: &str, user_agent: &str) -> Result<Vec<u8>> {
    let response: Response = CLIENT
        .get(url)
        .header(USER_AGENT_HEADER, user_agent)
        .send()
        .await?;

    if response.status() == StatusCode::NOT_FOUND {
        anyhow::bail!("Artifact not found: {}", url);
    }
    if !response.status().is_success() {
        anyhow::bail!("Download failed: {} ({})", url, response.status());
    }

    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}
