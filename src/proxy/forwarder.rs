//! Single-attempt upstream calls.
//!
//! A [`Forwarder`] owns the shared connection-pooled client, the upstream
//! base URL and the call timeout. [`Forwarder::forward`] turns a
//! [`ResourceRequest`] into one `GET`, bounded end to end by the timeout
//! (connect, response head and body), and returns the body bytes untouched.
//! A non-2xx status is a failure just like a timeout or a transport error.

use std::time::{Duration, Instant};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{ACCEPT, HeaderValue};
use hyper::Method;
use url::Url;

use super::routing::ResourceRequest;
use crate::config::UpstreamSettings;
use crate::error::ForwardError;
use crate::server::HttpClient;

#[derive(Clone)]
pub struct Forwarder {
    client: HttpClient,
    base_url: Url,
    timeout: Duration,
}

impl Forwarder {
    #[must_use]
    pub fn new(client: HttpClient, settings: &UpstreamSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.clone(),
            timeout: settings.timeout,
        }
    }

    /// Build the full upstream URL: base URL, then each segment
    /// percent-encoded on its own, then the query pairs form-encoded.
    #[must_use]
    pub fn upstream_url(&self, req: &ResourceRequest) -> Url {
        let mut url = self.base_url.clone();
        // The base URL is validated at startup to be a hierarchical http(s)
        // URL, so it always has path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(req.segments());
        }
        if !req.query().is_empty() {
            url.query_pairs_mut().extend_pairs(req.query());
        }
        url
    }

    #[allow(clippy::cast_possible_truncation)]
    pub async fn forward(
        &self,
        req: &ResourceRequest,
        correlation_id: &str,
    ) -> Result<Bytes, ForwardError> {
        let url = self.upstream_url(req);
        let start = Instant::now();

        let result = tokio::time::timeout(self.timeout, self.call(&url, correlation_id))
            .await
            .unwrap_or(Err(ForwardError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }));

        let latency_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(body) => tracing::info!(
                correlation_id = %correlation_id,
                upstream = %url,
                bytes = body.len(),
                latency_ms,
                "upstream responded"
            ),
            Err(e) => tracing::warn!(
                correlation_id = %correlation_id,
                upstream = %url,
                error = %e,
                latency_ms,
                "upstream call failed"
            ),
        }

        result
    }

    async fn call(&self, url: &Url, correlation_id: &str) -> Result<Bytes, ForwardError> {
        let uri: hyper::Uri = url
            .as_str()
            .parse()
            .map_err(|e: hyper::http::uri::InvalidUri| ForwardError::InvalidUri(Box::new(e)))?;

        let mut builder = hyper::Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(correlation_id) {
            builder = builder.header(super::CORRELATION_HEADER, value);
        }
        let request = builder
            .body(Full::new(Bytes::new()))
            .map_err(|e| ForwardError::InvalidUri(Box::new(e)))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| ForwardError::Transport(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::Status(status));
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| ForwardError::Transport(Box::new(e)))?
            .to_bytes();

        Ok(body)
    }
}
