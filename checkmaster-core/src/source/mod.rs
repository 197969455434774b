//! Remote product source.
//!
//! The upstream collection has no native pagination: every fetch pulls the
//! whole collection and slices `[offset, offset + limit)` locally. Fetched
//! records are always fresh candidates (pending, stamped with the fetch time),
//! whatever was decided about them before.

mod http;
mod memory;
mod middleware;

pub use http::{HttpProductSource, DEFAULT_API_URL};
pub use memory::StaticProductSource;
pub use middleware::{LoggingMiddleware, CORRELATION_ID_HEADER};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::product::Product;

/// Errors from a product source. Every variant is a network-kind failure.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The upstream answered with a non-success status.
    #[error("upstream returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The response body was not a list of posts.
    #[error("could not decode upstream response: {message}")]
    Decode { message: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {message}")]
    Client { message: String },

    /// The task running the fetch panicked or was aborted.
    #[error("fetch task did not complete: {message}")]
    Task { message: String },

    /// Configured to fail (offline test source).
    #[error("source unavailable")]
    Unavailable,
}

/// Anything that can serve a page of products.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Fetch up to `limit` products starting at `offset`.
    async fn fetch(&self, limit: usize, offset: usize) -> Result<Vec<Product>, SourceError>;
}

/// A record as served by the upstream collection.
///
/// Extra upstream fields (such as `userId`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpstreamPost {
    pub id: u64,
    pub title: String,
    pub body: String,
}

impl UpstreamPost {
    pub fn into_product(self, created_at: DateTime<Utc>) -> Product {
        Product::new(self.id, self.title, self.body, created_at)
    }
}

/// Slice `[offset, offset + limit)` out of the full collection and map it.
///
/// Out-of-range bounds are clamped: an offset past the end yields an empty page.
pub fn page_of(
    posts: Vec<UpstreamPost>,
    limit: usize,
    offset: usize,
    created_at: DateTime<Utc>,
) -> Vec<Product> {
    posts
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|post| post.into_product(created_at))
        .collect()
}
