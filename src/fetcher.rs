use anyhow::Context as _;
use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA};
use url::Url;

use crate::nav::NavError;

#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(user_agent: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build reqwest client")?;
        Ok(Self { client })
    }

    /// Single GET that asks every cache on the way to revalidate. No retries.
    pub async fn get_text_uncached(&self, url: Url) -> Result<String, NavError> {
        let resp = self
            .client
            .get(url.clone())
            .headers(no_cache_headers())
            .send()
            .await
            .map_err(|source| NavError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NavError::Status { url, status });
        }

        resp.text()
            .await
            .map_err(|source| NavError::Body { url, source })
    }
}

fn no_cache_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}
