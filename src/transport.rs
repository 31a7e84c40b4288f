//! HTTP transport for the swap API.
//!
//! A [`Transport`] issues exactly one request per [`Transport::send`] call,
//! enforces the configured deadline and turns non-success responses into
//! [`SwapError`]s through [`map_api_error`]. It never retries.
//!
//! The actual I/O goes through the [`Fetch`] capability so the caller can
//! inject a payment-aware implementation (see [`crate::payment::PaymentFetch`])
//! or a mock.

use crate::errors::{map_api_error, ErrorInfo, Result, SwapError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, Request, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Sends one HTTP request and returns the raw response.
///
/// Implementations may do more than one round trip (for example to satisfy a
/// 402 challenge) and may have side effects; the transport treats them as opaque.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Executes `request`.
    async fn fetch(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl Fetch for Client {
    async fn fetch(&self, request: Request) -> Result<Response> {
        Ok(self.execute(request).await?)
    }
}

#[async_trait]
impl<F: Fetch + ?Sized> Fetch for Arc<F> {
    async fn fetch(&self, request: Request) -> Result<Response> {
        (**self).fetch(request).await
    }
}

/// Single-request HTTP transport with a deadline.
#[derive(Clone)]
pub struct Transport {
    base_url: Url,
    fetch: Arc<dyn Fetch>,
    timeout: Duration,
    headers: HeaderMap,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// Creates a transport.
    pub fn new(base_url: Url, fetch: Arc<dyn Fetch>, timeout: Duration, headers: HeaderMap) -> Self {
        Self {
            base_url,
            fetch,
            timeout,
            headers,
        }
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Per-request deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the URL for `segments`, percent-encoding each one.
    pub fn url_for(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| SwapError::Config(format!("Base URL cannot be a base: {}", self.base_url)))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    /// Sends a request without a body.
    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.send::<(), T>(Method::GET, segments, None).await
    }

    /// Sends a JSON body with POST.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        self.send(Method::POST, segments, Some(body)).await
    }

    /// Sends one request and decodes the JSON response.
    ///
    /// Fails with [`SwapError::Timeout`] when no complete response arrives within
    /// the configured deadline, with a mapped server error on non-2xx statuses,
    /// and with [`SwapError::Network`] on anything else.
    pub async fn send<B, T>(&self, method: Method, segments: &[&str], body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url_for(segments)?;
        let request = self.build_request(method.clone(), url.clone(), body)?;
        let started = Instant::now();

        tracing::debug!(%method, %url, "sending request");

        // The deadline covers the response body as well as the headers. Dropping the
        // future on expiry aborts the in-flight request together with its timer.
        let outcome = tokio::time::timeout(self.timeout, self.round_trip(request)).await;

        match outcome {
            Ok(Ok((status, text))) => {
                tracing::debug!(
                    %method,
                    %url,
                    status,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "received response"
                );
                if (200..300).contains(&status) {
                    Ok(serde_json::from_str(&text)?)
                } else {
                    let body: Option<Value> = serde_json::from_str(&text).ok();
                    Err(map_api_error(status, body.as_ref()))
                }
            }
            Ok(Err(err)) => {
                tracing::debug!(%method, %url, error = %err, "request failed");
                Err(err)
            }
            Err(_) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                tracing::debug!(%method, %url, timeout_ms, "request timed out");
                Err(SwapError::Timeout(
                    ErrorInfo::new(format!("Request timed out after {}ms", timeout_ms)).with_details(
                        json!({
                            "timeoutMs": timeout_ms,
                            "method": method.as_str(),
                            "path": url.path(),
                        }),
                    ),
                ))
            }
        }
    }

    fn build_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Request> {
        let mut request = Request::new(method, url);

        let headers = request.headers_mut();
        headers.extend(self.headers.clone());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(body) = body {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| SwapError::Config(format!("Cannot serialize request body: {}", e)))?;
            *request.body_mut() = Some(bytes.into());
        }
        Ok(request)
    }

    async fn round_trip(&self, request: Request) -> Result<(u16, String)> {
        let response = self.fetch.fetch(request).await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok((status, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::test_utils::{MockFetch, MockReply};
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Pong {
        ok: bool,
    }

    fn transport(fetch: Arc<MockFetch>, timeout: Duration) -> Transport {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("secret"));
        Transport::new(
            Url::parse("https://swap.test/base/").unwrap(),
            fetch,
            timeout,
            headers,
        )
    }

    #[test]
    fn test_url_for_encodes_segments() {
        let t = transport(Arc::new(MockFetch::always(MockReply::json(200, "{}"))), Duration::from_secs(1));
        let url = t.url_for(&["api", "swap", "a b/c", "status"]).unwrap();
        assert_eq!(url.as_str(), "https://swap.test/base/api/swap/a%20b%2Fc/status");
    }

    #[tokio::test]
    async fn test_success_sets_headers_and_body() {
        let fetch = Arc::new(MockFetch::always(MockReply::json(200, r#"{"ok":true}"#)));
        let t = transport(fetch.clone(), Duration::from_secs(1));

        let pong: Pong = t.post(&["api", "ping"], &json!({"n": 1})).await.unwrap();
        assert_eq!(pong, Pong { ok: true });

        let calls = fetch.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::POST);
        assert_eq!(calls[0].path, "/base/api/ping");
        assert_eq!(calls[0].header("content-type").as_deref(), Some("application/json"));
        assert_eq!(calls[0].header("x-api-key").as_deref(), Some("secret"));
        assert_eq!(calls[0].json_body().unwrap(), json!({"n": 1}));
    }

    #[tokio::test]
    async fn test_get_has_no_body_but_content_type() {
        let fetch = Arc::new(MockFetch::always(MockReply::json(200, r#"{"ok":false}"#)));
        let t = transport(fetch.clone(), Duration::from_secs(1));

        let _: Pong = t.get(&["api", "chains"]).await.unwrap();
        let calls = fetch.calls();
        assert!(calls[0].body.is_none());
        assert_eq!(calls[0].header("content-type").as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_error_envelope_is_mapped() {
        let fetch = Arc::new(MockFetch::always(MockReply::json(
            400,
            r#"{"error":{"code":"AMOUNT_TOO_HIGH","message":"Max 10k","suggestion":"Split it"}}"#,
        )));
        let t = transport(fetch, Duration::from_secs(1));

        let err = t.get::<Pong>(&["api"]).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::AmountTooHigh);
        assert_eq!(err.suggestion(), Some("Split it"));
    }

    #[tokio::test]
    async fn test_non_json_error_uses_status_text() {
        let fetch = Arc::new(MockFetch::always(MockReply::json(502, "<html>Bad Gateway</html>")));
        let t = transport(fetch, Duration::from_secs(1));

        let err = t.get::<Pong>(&["api"]).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::RelayUnavailable);
        assert_eq!(err.message(), "HTTP 502 Bad Gateway");
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_network_error() {
        let fetch = Arc::new(MockFetch::always(MockReply::json(200, "not json")));
        let t = transport(fetch, Duration::from_secs(1));

        let err = t.get::<Pong>(&["api"]).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NetworkError);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_network_error() {
        let fetch = Arc::new(MockFetch::always(MockReply::Fail("connection refused".into())));
        let t = transport(fetch, Duration::from_secs(1));

        let err = t.get::<Pong>(&["api"]).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NetworkError);
        assert!(err.message().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_deadline_yields_timeout() {
        let fetch = Arc::new(
            MockFetch::always(MockReply::json(200, r#"{"ok":true}"#))
                .with_delay(Duration::from_millis(500)),
        );
        let t = transport(fetch, Duration::from_millis(50));

        let started = Instant::now();
        let err = t.get::<Pong>(&["api", "slow"]).await.unwrap_err();
        assert!(started.elapsed() < Duration::from_millis(400));
        assert_eq!(err.code(), ErrorCode::Timeout);
        assert_eq!(err.details().unwrap()["timeoutMs"], 50);
        assert_eq!(err.details().unwrap()["path"], "/base/api/slow");
    }
}
