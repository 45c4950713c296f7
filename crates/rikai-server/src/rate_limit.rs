//! Per-client token-bucket throttling.
//!
//! Pointer-move lookups arrive in bursts; the core stays synchronous and
//! cheap, so throttling happens here at the HTTP edge rather than inside
//! the lookup path.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use dashmap::DashMap;
use tower::{Layer, Service};
use tracing::debug;

/// Buckets tracked before idle entries are swept.
const SWEEP_THRESHOLD: usize = 10_000;
/// Idle time after which a bucket is dropped during a sweep.
const IDLE_SECS: f64 = 60.0;

#[derive(Clone)]
pub struct ThrottleLayer {
    rate_per_sec: f64,
    burst: f64,
}

impl ThrottleLayer {
    pub fn new(rate_per_sec: u32, burst: u32) -> Self {
        Self {
            rate_per_sec: rate_per_sec as f64,
            burst: burst as f64,
        }
    }
}

impl<S> Layer<S> for ThrottleLayer {
    type Service = Throttle<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Throttle {
            inner,
            buckets: Arc::new(DashMap::new()),
            rate_per_sec: self.rate_per_sec,
            burst: self.burst,
        }
    }
}

#[derive(Clone)]
pub struct Throttle<S> {
    inner: S,
    buckets: Arc<DashMap<String, Bucket>>,
    rate_per_sec: f64,
    burst: f64,
}

#[derive(Clone, Copy, Debug)]
struct Bucket {
    tokens: f64,
    updated: Instant,
}

impl<S, ReqBody> Service<axum::http::Request<ReqBody>> for Throttle<S>
where
    S: Service<axum::http::Request<ReqBody>, Response = axum::http::Response<axum::body::Body>>
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: axum::http::Request<ReqBody>) -> Self::Future {
        if let Some(client) = client_ip(&req)
            && !self.admit(&client)
        {
            debug!("throttled request from {client}");
            return Box::pin(async move {
                Ok(axum::http::Response::builder()
                    .status(axum::http::StatusCode::TOO_MANY_REQUESTS)
                    .body(axum::body::Body::from("rate limited"))
                    .unwrap())
            });
        }

        let fut = self.inner.call(req);
        Box::pin(fut)
    }
}

impl<S> Throttle<S> {
    fn admit(&self, client: &str) -> bool {
        if self.buckets.len() > SWEEP_THRESHOLD {
            let now = Instant::now();
            self.buckets.retain(|_, bucket| {
                now.saturating_duration_since(bucket.updated).as_secs_f64() < IDLE_SECS
            });
        }

        let now = Instant::now();
        let mut entry = self.buckets.entry(client.to_string()).or_insert(Bucket {
            tokens: self.burst,
            updated: now,
        });
        let elapsed = now.saturating_duration_since(entry.updated).as_secs_f64();
        entry.tokens = (entry.tokens + elapsed * self.rate_per_sec).min(self.burst);
        entry.updated = now;
        if entry.tokens >= 1.0 {
            entry.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Client address from the reverse proxy, first hop wins.
fn client_ip<B>(req: &axum::http::Request<B>) -> Option<String> {
    req.headers()
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
        .and_then(|list| list.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}
