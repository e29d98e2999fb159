use crate::error::{MonoError, TOO_MANY_REQUESTS};
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Handle to one pooled HTTP connection set.
///
/// Clones share the pool and the closed flag, so closing any clone closes
/// them all. A closed session is never used to issue requests again.
#[derive(Debug, Clone)]
pub struct Session {
    http: HttpClient,
    closed: Arc<AtomicBool>,
}

impl Session {
    pub fn open() -> Result<Self, MonoError> {
        let http = HttpClient::builder().build()?;
        debug!("Opened new HTTP session");
        Ok(Self::from_client(http))
    }

    /// Wrap an already configured `reqwest` client (proxies, custom TLS, timeouts).
    pub fn from_client(http: HttpClient) -> Self {
        Self {
            http,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Mark the session closed. Returns `false` if it already was.
    pub fn close(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn http(&self) -> &HttpClient {
        &self.http
    }
}

/// Extra headers and an optional JSON body for a single request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub json: Option<Value>,
}

impl RequestOptions {
    pub fn json(body: Value) -> Self {
        Self {
            headers: HeaderMap::new(),
            json: Some(body),
        }
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Turn a non-success status into the matching error, passing the body through.
pub(crate) fn classify_response(status: StatusCode, body: String) -> Result<String, MonoError> {
    if status.is_success() {
        return Ok(body);
    }
    if status.as_u16() == TOO_MANY_REQUESTS {
        return Err(MonoError::RateLimitExceeded(body));
    }
    Err(MonoError::Api {
        status: status.as_u16(),
        body,
    })
}

/// Parse a successful body; an empty body is treated as JSON `null`.
pub(crate) fn parse_json(body: &str) -> Result<Value, MonoError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(MonoError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status(code: u16) -> StatusCode {
        StatusCode::from_u16(code).unwrap()
    }

    #[test]
    fn classifies_rate_limit_status() {
        let err = classify_response(status(249), "slow down".into()).unwrap_err();
        assert!(matches!(err, MonoError::RateLimitExceeded(ref body) if body == "slow down"));
    }

    #[test]
    fn standard_429_is_a_generic_api_error() {
        let err = classify_response(status(429), "nope".into()).unwrap_err();
        assert!(matches!(err, MonoError::Api { status: 429, .. }));
    }

    #[test]
    fn classifies_server_error() {
        let err = classify_response(status(500), "server error".into()).unwrap_err();
        match err {
            MonoError::Api { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "server error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn passes_success_body_through() {
        let body = classify_response(StatusCode::OK, "[]".into()).unwrap();
        assert_eq!(parse_json(&body).unwrap(), json!([]));
        assert_eq!(parse_json("  ").unwrap(), Value::Null);
        assert!(matches!(parse_json("not json"), Err(MonoError::Decode(_))));
    }

    #[test]
    fn closing_twice_is_harmless() {
        let session = Session::open().unwrap();
        let shared = session.clone();
        assert!(!session.is_closed());
        assert!(session.close());
        assert!(!session.close());
        assert!(shared.is_closed());
    }
}
