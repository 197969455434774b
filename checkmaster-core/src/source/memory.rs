//! In-process product source for tests and offline runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::{page_of, ProductSource, SourceError, UpstreamPost};
use crate::product::Product;

/// Serves a fixed upstream collection.
///
/// Can be switched to fail every request, and can delay responses per offset
/// to exercise out-of-order completion.
#[derive(Debug, Default)]
pub struct StaticProductSource {
    posts: Vec<UpstreamPost>,
    failing: AtomicBool,
    requests: AtomicUsize,
    delays: HashMap<usize, Duration>,
}

impl StaticProductSource {
    pub fn new(posts: Vec<UpstreamPost>) -> Self {
        Self {
            posts,
            ..Default::default()
        }
    }

    /// `count` posts with ids `1..=count`.
    pub fn numbered(count: u64) -> Self {
        Self::new(
            (1..=count)
                .map(|id| UpstreamPost {
                    id,
                    title: format!("Product {}", id),
                    body: format!("Description of product {}", id),
                })
                .collect(),
        )
    }

    /// Delay every fetch starting at `offset` by `delay`.
    pub fn with_delay(mut self, offset: usize, delay: Duration) -> Self {
        self.delays.insert(offset, delay);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of fetches served so far, failed ones included.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductSource for StaticProductSource {
    async fn fetch(&self, limit: usize, offset: usize) -> Result<Vec<Product>, SourceError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(&offset) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable);
        }

        Ok(page_of(self.posts.clone(), limit, offset, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_pages_and_counts_requests() {
        let source = StaticProductSource::numbered(20);
        let first = source.fetch(10, 0).await.unwrap();
        let second = source.fetch(7, 10).await.unwrap();

        assert_eq!(first.len(), 10);
        assert_eq!(second.first().map(|p| p.id.0), Some(11));
        assert_eq!(source.request_count(), 2);
    }

    #[tokio::test]
    async fn test_failing_toggle() {
        let source = StaticProductSource::numbered(3);
        source.set_failing(true);
        assert!(matches!(
            source.fetch(10, 0).await,
            Err(SourceError::Unavailable)
        ));

        source.set_failing(false);
        assert_eq!(source.fetch(10, 0).await.unwrap().len(), 3);
        assert_eq!(source.request_count(), 2);
    }
}
