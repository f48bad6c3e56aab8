// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::Client;

use crate::error::Result;
use crate::models::CrawlerConfig;

/// Create a configured asynchronous HTTP client.
///
/// Cookies are kept so a form page and its postback share a session.
pub fn create_async_client(config: &CrawlerConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .cookie_store(true)
        .build()?;
    Ok(client)
}

/// Thin wrapper issuing paced requests and returning response bodies.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    delay: Duration,
}

impl Fetcher {
    pub fn new(client: Client, delay: Duration) -> Self {
        Self { client, delay }
    }

    /// Build a fetcher from crawler settings.
    pub fn from_config(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self::new(
            create_async_client(config)?,
            Duration::from_millis(config.request_delay_ms),
        ))
    }

    async fn pace(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    /// GET a URL and return its body; non-2xx statuses are errors.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        self.pace().await;
        log::debug!("GET {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    /// POST url-encoded form fields and return the body.
    pub async fn post_form(&self, url: &str, form: &[(String, String)]) -> Result<String> {
        self.pace().await;
        log::debug!("POST {} ({} fields)", url, form.len());
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}
