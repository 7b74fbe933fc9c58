use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use tracing::debug;

use crate::config::SiteConfig;
use crate::utils::{Error, Result};

fn default_headers(config: &SiteConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(ua) = HeaderValue::from_str(&config.user_agent) {
        headers.insert(USER_AGENT, ua);
    }
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9,ja;q=0.8"),
    );
    headers
}

/// Client for search/detail page requests.
pub fn page_client(config: &SiteConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .default_headers(default_headers(config))
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(Error::from)
}

/// Client for image downloads; same headers, longer timeout.
pub fn image_client(config: &SiteConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .default_headers(default_headers(config))
        .timeout(Duration::from_secs(config.image_timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(Error::from)
}

/// GET a page and return its body. Non-2xx responses are an error carrying
/// the status code, not a body.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String> {
    debug!(target: "javmeta::http", url = %url, "GET");
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(Error::FetchError {
            url: url.to_string(),
            status,
        });
    }
    Ok(resp.text().await?)
}

pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    debug!(target: "javmeta::http", url = %url, "GET (binary)");
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(Error::FetchError {
            url: url.to_string(),
            status,
        });
    }
    Ok(resp.bytes().await?.to_vec())
}
