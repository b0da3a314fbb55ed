use log2::debug;
use reqwest::Client;
use url::Url;

use super::config::CrawlerConfig;
use super::error::CrawlError;

/// Raw response of a successful fetch.
#[derive(Debug, Clone)]
pub struct FetchedResource {
    pub content: Vec<u8>,
    pub content_type: String,
}

/// One HTTP client per crawl, carrying the configured identity and timeout.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { client })
    }

    /// Single GET, no retries. A non-2xx status is an error carrying the code.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedResource, CrawlError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let content = response.bytes().await?.to_vec();
        debug!("Fetched {} ({} bytes, {})", url, content.len(), content_type);

        Ok(FetchedResource {
            content,
            content_type,
        })
    }
}
