use std::fmt;

use reqwest::{header::HeaderMap, Method, StatusCode};
use serde_json::Value as JsonValue;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{options::REQUEST_TIMEOUT, KeeperError, ProxyAgent, Result, RetryPolicy};

/// One HTTP call, fully described up front. Immutable once built.
#[derive(Clone, Debug)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<JsonValue>,
}

impl RequestSpec {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: JsonValue) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: HeaderMap::new(),
            body: Some(body),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// A response that made it back with a status below 500. The caller inspects
/// the status and body itself; a 4xx still lands here.
#[derive(Clone, Debug)]
pub struct Delivered {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Delivered {
    /// Parses the body as JSON, if it is JSON at all.
    pub fn json(&self) -> Option<JsonValue> {
        serde_json::from_str(&self.body).ok()
    }
}

#[derive(Clone)]
/// HTTP executor bound to one proxy configuration and one retry policy.
pub struct ApiClient {
    http: reqwest::Client,
    policy: RetryPolicy,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("policy", &self.policy)
            .finish()
    }
}

impl ApiClient {
    /// Creates an executor with the default policy (30 attempts, 2 s base).
    pub fn new(proxy: &ProxyAgent) -> Result<Self> {
        Self::with_policy(proxy, RetryPolicy::default())
    }

    pub fn with_policy(proxy: &ProxyAgent, policy: RetryPolicy) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(REQUEST_TIMEOUT);
        if let Some(proxy) = proxy.to_reqwest()? {
            builder = builder.proxy(proxy);
        }
        let http = builder
            .build()
            .map_err(|err| KeeperError::Config(format!("failed to build http client: {err}")))?;
        Ok(Self { http, policy })
    }

    /// Issues the request, retrying until a response with status below 500
    /// is delivered or the attempt budget runs out.
    ///
    /// Status 500 retries back off exponentially (`base * 1.5^(attempt-1)`).
    /// Every other failure — other 5xx, connect error, timeout — retries at
    /// the fixed base interval. The last attempt's error is returned as-is.
    pub async fn execute(&self, spec: &RequestSpec) -> Result<Delivered> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1u32;
        loop {
            let last = attempt >= max_attempts;
            let mut request = self
                .http
                .request(spec.method.clone(), &spec.url)
                .headers(spec.headers.clone());
            if let Some(body) = &spec.body {
                request = request.json(body);
            }

            // A failed body read is treated the same as a failed send.
            let outcome = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    let headers = response.headers().clone();
                    match response.text().await {
                        Ok(body) => Ok((status, headers, body)),
                        Err(err) => Err(err),
                    }
                }
                Err(err) => Err(err),
            };

            match outcome {
                Ok((status, headers, body)) if status.as_u16() < 500 => {
                    debug!(
                        attempt,
                        url = %spec.url,
                        status = status.as_u16(),
                        "request delivered"
                    );
                    return Ok(Delivered {
                        status,
                        headers,
                        body,
                    });
                }
                Ok((status, _, body)) => {
                    let err = KeeperError::Http {
                        status: status.as_u16(),
                        status_text: status.canonical_reason().unwrap_or("").to_owned(),
                        method: spec.method.to_string(),
                        url: spec.url.clone(),
                        body,
                        request_headers: spec.headers.clone(),
                    };
                    if last {
                        return Err(err);
                    }
                    let wait = if status == StatusCode::INTERNAL_SERVER_ERROR {
                        self.policy.server_error_backoff(attempt)
                    } else {
                        self.policy.transient_backoff()
                    };
                    warn!(
                        attempt,
                        url = %spec.url,
                        status = status.as_u16(),
                        wait_ms = wait.as_millis() as u64,
                        "server error, retrying"
                    );
                    sleep(wait).await;
                }
                Err(err) => {
                    if last {
                        return Err(KeeperError::Transport {
                            method: spec.method.to_string(),
                            url: spec.url.clone(),
                            source: err,
                        });
                    }
                    let wait = self.policy.transient_backoff();
                    warn!(
                        attempt,
                        url = %spec.url,
                        error = %err,
                        wait_ms = wait.as_millis() as u64,
                        "transport error, retrying"
                    );
                    sleep(wait).await;
                }
            }
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Delivered, RequestSpec};
    use reqwest::{header::HeaderMap, Method, StatusCode};
    use serde_json::json;

    #[test]
    fn post_spec_carries_body_and_method() {
        let spec = RequestSpec::post("https://example.test/claim", json!({"a": 1}));
        assert_eq!(spec.method, Method::POST);
        assert_eq!(spec.url, "https://example.test/claim");
        assert_eq!(spec.body, Some(json!({"a": 1})));
    }

    #[test]
    fn delivered_json_is_none_for_non_json_bodies() {
        let delivered = Delivered {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: "<html>gateway</html>".to_owned(),
        };
        assert!(delivered.json().is_none());

        let delivered = Delivered {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: r#"{"message":"ok"}"#.to_owned(),
        };
        assert_eq!(delivered.json(), Some(json!({"message": "ok"})));
    }
}
