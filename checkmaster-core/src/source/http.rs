use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use tracing::debug;

use super::middleware::LoggingMiddleware;
use super::{page_of, ProductSource, SourceError, UpstreamPost};
use crate::product::Product;

/// Public collection the review queue is fed from.
pub const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com/posts";

/// Product source backed by the upstream HTTP collection.
pub struct HttpProductSource {
    client: ClientWithMiddleware,
    url: String,
}

impl HttpProductSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("checkmaster/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::Client {
                message: e.to_string(),
            })?;

        let client = ClientBuilder::new(inner)
            .with(LoggingMiddleware::new())
            .build();

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn fetch_all(&self) -> Result<Vec<UpstreamPost>, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SourceError::Transport {
                url: self.url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| SourceError::Transport {
            url: self.url.clone(),
            message: e.to_string(),
        })?;

        serde_json::from_slice(&body).map_err(|e| SourceError::Decode {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl ProductSource for HttpProductSource {
    async fn fetch(&self, limit: usize, offset: usize) -> Result<Vec<Product>, SourceError> {
        let posts = self.fetch_all().await?;
        debug!(
            "Upstream returned {} posts, slicing [{}, {})",
            posts.len(),
            offset,
            offset.saturating_add(limit)
        );
        Ok(page_of(posts, limit, offset, Utc::now()))
    }
}
