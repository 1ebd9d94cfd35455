//! The single-request HTTP fetches shared by every command.

use std::time::Duration;

use crate::prelude::*;

pub fn client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {e}"))
}

async fn check_response(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(Error::HttpStatus {
        context: context.to_string(),
        status,
        body,
    }
    .into())
}

/// GET `url` and return the body text. Sends `Authorization: Bearer <key>`
/// when a key is given.
pub async fn fetch_text(client: &reqwest::Client, url: &str, api_key: Option<&str>) -> Result<String> {
    log::debug!("GET {url}");

    let mut request = client.get(url);
    if let Some(key) = api_key {
        request = request.bearer_auth(key);
    }

    let response = request
        .send()
        .await
        .map_err(|e| eyre!("Failed to fetch {url}: {e}"))?;
    let response = check_response(response, &f!("Failed to fetch {url}")).await?;

    let body = response
        .text()
        .await
        .map_err(|e| eyre!("Failed to read response from {url}: {e}"))?;
    log::debug!("Received {} bytes from {url}", body.len());

    Ok(body)
}
