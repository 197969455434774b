use std::time::Instant;

use reqwest::{header::HeaderValue, Request, Response};
use reqwest_middleware::{Middleware, Next, Result as MiddlewareResult};
use tracing::{debug, warn};
use uuid::Uuid;

/// Header carrying the per-request correlation id.
pub const CORRELATION_ID_HEADER: &str = "x-checkmaster-correlation-id";

/// Tags each outgoing request with a correlation id and logs its outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Middleware for LoggingMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut http::Extensions,
        next: Next<'_>,
    ) -> MiddlewareResult<Response> {
        // Keep a caller-supplied id, otherwise mint one
        let correlation_id = match req
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            Some(existing) => existing.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                if let Ok(value) = HeaderValue::from_str(&id) {
                    req.headers_mut().insert(CORRELATION_ID_HEADER, value);
                }
                id
            }
        };

        let method = req.method().clone();
        let url = req.url().clone();
        debug!(%correlation_id, "{} {}", method, url);

        let started = Instant::now();
        let response = next.run(req, extensions).await;
        let elapsed_ms = started.elapsed().as_millis();

        match &response {
            Ok(resp) if resp.status().is_success() => {
                debug!(
                    %correlation_id,
                    "{} {} -> {} in {}ms",
                    method,
                    url,
                    resp.status().as_u16(),
                    elapsed_ms
                );
            }
            Ok(resp) => {
                warn!(
                    %correlation_id,
                    "{} {} -> {} in {}ms",
                    method,
                    url,
                    resp.status().as_u16(),
                    elapsed_ms
                );
            }
            Err(err) => {
                warn!(
                    %correlation_id,
                    "{} {} failed after {}ms: {}",
                    method, url, elapsed_ms, err
                );
            }
        }

        response
    }
}
