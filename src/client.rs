use crate::error::MonoError;
use crate::models::{
    ClientInfo, CurrencyRate, StatementItem, Webhook, parse_client_info, parse_currency_rates,
    parse_statement,
};
use crate::session::{RequestOptions, Session, classify_response, parse_json};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::ops::{Deref, DerefMut};

const BASE_URL: &str = "https://api.monobank.ua";
const TOKEN_HEADER: HeaderName = HeaderName::from_static("x-token");
/// Statement window used when the caller gives no lower bound.
const DEFAULT_STATEMENT_WEEKS: i64 = 4;

/// Headers a client attaches to every request it sends.
pub trait Credentials {
    fn apply(&self, headers: &mut HeaderMap);
}

/// Marker for credentials that unlock the `/personal` endpoints.
pub trait Authenticated: Credentials {}

/// Anonymous access, only public endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct Public;

impl Credentials for Public {
    fn apply(&self, _headers: &mut HeaderMap) {}
}

/// Personal token issued at api.monobank.ua.
#[derive(Debug, Clone)]
pub struct Personal {
    token: HeaderValue,
}

impl Credentials for Personal {
    fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(TOKEN_HEADER, self.token.clone());
    }
}

impl Authenticated for Personal {}

/// Corporate access. Sends the token the same way personal clients do; the
/// corporate-only endpoints are not wrapped yet.
#[derive(Debug, Clone)]
pub struct Corporate {
    token: HeaderValue,
}

impl Credentials for Corporate {
    fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(TOKEN_HEADER, self.token.clone());
    }
}

impl Authenticated for Corporate {}

pub type PublicMonoClient = MonoClient<Public>;
pub type PersonalMonoClient = MonoClient<Personal>;
pub type CorporateMonoClient = MonoClient<Corporate>;

/// Client for the monobank open API.
///
/// The underlying [`Session`] is opened lazily on the first request and
/// reopened if it was closed in the meantime.
#[derive(Debug, Clone)]
pub struct MonoClient<A = Public> {
    credentials: A,
    session: Option<Session>,
    base_url: String,
}

impl MonoClient<Public> {
    /// Create a client for the public endpoints.
    pub fn new() -> Self {
        Self::with_credentials(Public)
    }
}

impl Default for MonoClient<Public> {
    fn default() -> Self {
        Self::new()
    }
}

impl MonoClient<Personal> {
    /// Create a personal client. No request is made until an endpoint is called.
    pub fn new(token: impl Into<String>) -> Result<Self, MonoError> {
        let token = validate_token(token.into())?;
        info!("Initialized personal monobank client");
        Ok(Self::with_credentials(Personal { token }))
    }
}

impl MonoClient<Corporate> {
    pub fn new(token: impl Into<String>) -> Result<Self, MonoError> {
        let token = validate_token(token.into())?;
        info!("Initialized corporate monobank client");
        Ok(Self::with_credentials(Corporate { token }))
    }
}

impl<A: Credentials> MonoClient<A> {
    fn with_credentials(credentials: A) -> Self {
        Self {
            credentials,
            session: None,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Override the base URL (useful for tests or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        info!("Updated monobank API base URL to {}", self.base_url);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current session, opening a new one if none is held or it was closed.
    pub fn session(&mut self) -> Result<&Session, MonoError> {
        let reusable = self.session.take().filter(|s| !s.is_closed());
        let session = match reusable {
            Some(session) => session,
            None => Session::open()?,
        };
        Ok(self.session.insert(session))
    }

    /// Replace the held session. A closed session is rejected.
    pub fn set_session(&mut self, session: Session) -> Result<(), MonoError> {
        if session.is_closed() {
            return Err(MonoError::Configuration(
                "session must be an open HTTP session".into(),
            ));
        }
        self.session = Some(session);
        Ok(())
    }

    /// Release the held session. Does nothing if there is none.
    pub fn close(&mut self) {
        if let Some(session) = self.session.take()
            && session.close()
        {
            info!("Session closed");
        }
    }

    /// Open or reuse the session for the lifetime of the returned guard,
    /// which closes it when dropped.
    ///
    /// Fails with [`MonoError::SyncUsage`] outside of a Tokio runtime since
    /// every request made through the guard is async.
    pub fn enter(&mut self) -> Result<ScopedClient<'_, A>, MonoError> {
        tokio::runtime::Handle::try_current().map_err(|_| MonoError::SyncUsage)?;
        self.session()?;
        Ok(ScopedClient { client: self })
    }

    /// Issue a request and return the raw body of a successful response.
    pub async fn send(
        &mut self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<String, MonoError> {
        let url = format!("{}{}", self.base_url, path);
        let mut headers = options.headers;
        self.credentials.apply(&mut headers);

        let http = self.session()?.http().clone();
        debug!("{} request to {}", method, url);
        let mut request = http.request(method, url).headers(headers);
        if let Some(body) = &options.json {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("Received status {}", status);
        let body = response.text().await?;
        classify_response(status, body)
    }

    /// Issue a request and parse the successful body as untyped JSON.
    pub async fn request(
        &mut self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value, MonoError> {
        let body = self.send(method, path, options).await?;
        parse_json(&body)
    }

    pub async fn get(&mut self, path: &str, options: RequestOptions) -> Result<Value, MonoError> {
        self.request(Method::GET, path, options).await
    }

    pub async fn post(&mut self, path: &str, options: RequestOptions) -> Result<Value, MonoError> {
        self.request(Method::POST, path, options).await
    }

    /// Fetch the bank's currency exchange rates.
    pub async fn get_currency(&mut self) -> Result<Vec<CurrencyRate>, MonoError> {
        let body = self
            .send(Method::GET, "/bank/currency", RequestOptions::default())
            .await?;
        parse_currency_rates(&body)
    }
}

impl<A: Authenticated> MonoClient<A> {
    /// Fetch the client profile with its accounts and jars.
    pub async fn client_info(&mut self) -> Result<ClientInfo, MonoError> {
        let body = self
            .send(Method::GET, "/personal/client-info", RequestOptions::default())
            .await?;
        parse_client_info(&body)
    }

    /// Register `url` as the webhook. The response body is not inspected.
    pub async fn set_webhook(&mut self, url: &str) -> Result<Webhook, MonoError> {
        let webhook = Webhook {
            web_hook_url: url.to_string(),
        };
        let body = serde_json::to_value(&webhook)?;
        info!("Setting webhook URL to {}", url);
        self.send(Method::POST, "/personal/webhook", RequestOptions::json(body))
            .await?;
        Ok(webhook)
    }

    /// Fetch statement items of `account_id` between two instants.
    ///
    /// Missing bounds default to four weeks ago and now, evaluated on each call.
    /// Account `"0"` selects the client's default account.
    pub async fn get_statement(
        &mut self,
        account_id: &str,
        date_from: Option<DateTime<Utc>>,
        date_to: Option<DateTime<Utc>>,
    ) -> Result<Vec<StatementItem>, MonoError> {
        let (from, to) = statement_bounds(date_from, date_to, Utc::now());
        let path = format!(
            "/personal/statement/{}/{}/{}",
            urlencoding::encode(account_id),
            from,
            to
        );
        debug!(
            "Fetching statement for account {} from {} to {}",
            account_id, from, to
        );
        let body = self
            .send(Method::GET, &path, RequestOptions::default())
            .await?;
        parse_statement(&body)
    }
}

/// Client borrowed for a scope; closes the session when dropped.
#[derive(Debug)]
pub struct ScopedClient<'a, A: Credentials> {
    client: &'a mut MonoClient<A>,
}

impl<A: Credentials> Deref for ScopedClient<'_, A> {
    type Target = MonoClient<A>;

    fn deref(&self) -> &Self::Target {
        self.client
    }
}

impl<A: Credentials> DerefMut for ScopedClient<'_, A> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.client
    }
}

impl<A: Credentials> Drop for ScopedClient<'_, A> {
    fn drop(&mut self) {
        self.client.close();
    }
}

fn validate_token(token: String) -> Result<HeaderValue, MonoError> {
    let mut value = HeaderValue::from_str(&token)
        .map_err(|e| MonoError::Validation(format!("token is not a valid header value: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Resolve statement bounds to whole-second UTC timestamps.
fn statement_bounds(
    date_from: Option<DateTime<Utc>>,
    date_to: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (i64, i64) {
    let from = date_from.unwrap_or(now - Duration::weeks(DEFAULT_STATEMENT_WEEKS));
    let to = date_to.unwrap_or(now);
    (from.timestamp(), to.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rejects_tokens_unusable_as_header() {
        assert!(matches!(
            PersonalMonoClient::new("line\nbreak"),
            Err(MonoError::Validation(_))
        ));
        assert!(matches!(
            CorporateMonoClient::new("nul\0byte"),
            Err(MonoError::Validation(_))
        ));
    }

    #[test]
    fn accepts_any_token_usable_as_header() {
        assert!(PersonalMonoClient::new("abc def").is_ok());
        assert!(PersonalMonoClient::new("uXaTLd3Ygz-L6Ruw_WQSB").is_ok());
        assert!(CorporateMonoClient::new("tab\tseparated").is_ok());
    }

    #[test]
    fn construction_does_not_open_a_session() {
        let client = PersonalMonoClient::new("uXaTLd3YgzL6RuwWQSBdHC9V4l3ZPW8_RJAf1dkIm3VY").unwrap();
        assert!(client.session.is_none());
        assert_eq!(client.base_url(), BASE_URL);
    }

    #[test]
    fn token_is_redacted_in_debug_output() {
        let client = PersonalMonoClient::new("secret-token").unwrap();
        assert!(!format!("{client:?}").contains("secret-token"));
    }

    #[test]
    fn session_is_reopened_after_close() {
        let mut client = PublicMonoClient::new();
        let first = client.session().unwrap().clone();
        let again = client.session().unwrap().clone();
        assert!(!again.is_closed());

        client.close();
        client.close();
        assert!(first.is_closed());

        let reopened = client.session().unwrap().clone();
        assert!(!reopened.is_closed());
    }

    #[test]
    fn rejects_closed_session_assignment() {
        let mut client = PublicMonoClient::new();
        let session = Session::open().unwrap();
        session.close();
        assert!(matches!(
            client.set_session(session),
            Err(MonoError::Configuration(_))
        ));

        let open = Session::open().unwrap();
        client.set_session(open.clone()).unwrap();
        client.close();
        assert!(open.is_closed());
    }

    #[test]
    fn scoped_session_needs_async_runtime() {
        let mut client = PublicMonoClient::new();
        assert!(matches!(client.enter(), Err(MonoError::SyncUsage)));
        assert!(client.session.is_none());
    }

    #[tokio::test]
    async fn scope_closes_session_on_exit() {
        let mut client = PublicMonoClient::new();
        let handle = {
            let mut scope = client.enter().unwrap();
            scope.session().unwrap().clone()
        };
        assert!(handle.is_closed());
        assert!(client.session.is_none());
    }

    #[test]
    fn statement_bounds_default_to_four_weeks() {
        let now = Utc.with_ymd_and_hms(2024, 3, 29, 12, 0, 0).unwrap();
        let (from, to) = statement_bounds(None, None, now);
        assert_eq!(to, now.timestamp());
        assert_eq!(to - from, 28 * 24 * 60 * 60);
    }

    #[test]
    fn statement_bounds_truncate_to_seconds() {
        let from = Utc.timestamp_millis_opt(1_700_000_000_999).unwrap();
        let to = Utc.timestamp_millis_opt(1_700_000_100_500).unwrap();
        let (a, b) = statement_bounds(Some(from), Some(to), Utc::now());
        assert_eq!((a, b), (1_700_000_000, 1_700_000_100));
    }
}
