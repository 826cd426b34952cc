use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::{Client, ClientBuilder, Response};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, warn};

const ACCEPT_LANGUAGE_VALUE: &str = "es-PE,es;q=0.9,en;q=0.8";

pub fn create_client(user_agent: &str) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));

    let client = ClientBuilder::new()
        .user_agent(user_agent)
        .default_headers(headers)
        .cookie_store(true)
        .timeout(Duration::from_secs(25))
        .pool_max_idle_per_host(6)
        .build()?;

    Ok(client)
}

/// GET `url`, retrying transport errors and 5xx responses with exponential backoff.
/// Client errors (4xx) are returned immediately.
pub async fn fetch_with_retry(client: &Client, url: &str, max_retries: u32) -> Result<Response> {
    let mut attempts = 0;
    let mut last_error = None;

    while attempts < max_retries {
        match client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }

                warn!("HTTP error {}: {}", status, url);
                if status.is_client_error() {
                    return Err(anyhow::anyhow!("HTTP error: {}", status))
                        .context(format!("Failed to fetch {}", url));
                }
                last_error = Some(anyhow::anyhow!("HTTP error: {}", status));
            }
            Err(e) => {
                error!("Request failed for {}: {}", url, e);
                last_error = Some(e.into());
            }
        }

        attempts += 1;
        if attempts < max_retries {
            let delay = Duration::from_secs(2u64.pow(attempts));
            warn!("Retrying in {:?}... (attempt {}/{})", delay, attempts + 1, max_retries);
            sleep(delay).await;
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Max retries exceeded")))
        .context(format!("Failed to fetch {} after {} attempts", url, max_retries))
}
