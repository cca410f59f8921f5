//! API client for the marketplace domain API.
//!
//! Every request resolves its endpoint against the configured base URL and,
//! unless told otherwise, carries the stored access token. A 401 on an
//! authenticated request ends the session: storage is cleared, the user is
//! told once and sent back to the root.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::models::UserRecord;
use crate::ports::{Navigator, Notification, Notifier};
use crate::store::SessionStore;

use super::error::{NETWORK_ERROR_MESSAGE, SESSION_EXPIRED_MESSAGE};
use super::ApiError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Where a forced logout sends the user
const ROOT_PATH: &str = "/";

/// Per-request options.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    /// Send without the bearer token, and leave 401s to the caller
    pub skip_auth: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: None,
            skip_auth: false,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }
}

/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Option<String>,
    store: SessionStore,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    // In-memory user of the session manager this client belongs to
    session_user: Option<Arc<watch::Sender<Option<UserRecord>>>>,
}

impl ApiClient {
    pub fn new(
        base_url: Option<String>,
        store: SessionStore,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self::with_client(client, base_url, store, notifier, navigator))
    }

    /// Build on an existing client, sharing its connection pool.
    pub fn with_client(
        client: Client,
        base_url: Option<String>,
        store: SessionStore,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            client,
            base_url,
            store,
            notifier,
            navigator,
            session_user: None,
        }
    }

    /// Evict this in-memory user too when a 401 ends the session.
    pub(crate) fn attach_session_user(
        mut self,
        user: Arc<watch::Sender<Option<UserRecord>>>,
    ) -> Self {
        self.session_user = Some(user);
        self
    }

    /// Absolute URLs pass through, anything else hangs off the base URL.
    pub fn resolve(&self, endpoint: &str) -> Result<String, ApiError> {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return Ok(endpoint.to_string());
        }
        let base = self.base_url.as_deref().ok_or_else(|| {
            ApiError::InvalidUrl(format!("no API base URL configured for {}", endpoint))
        })?;
        Ok(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        ))
    }

    /// Send a request and hand back the raw response.
    ///
    /// Non-success statuses other than an authenticated 401 are returned as
    /// responses; the body is left for the caller to read.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Response, ApiError> {
        let url = self.resolve(endpoint)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.extend(options.headers);

        if !options.skip_auth {
            if let Some(token) = self.store.access_token() {
                headers.insert(
                    header::AUTHORIZATION,
                    HeaderValue::from_str(&format!("Bearer {}", token))?,
                );
            }
        }

        let mut builder = self
            .client
            .request(options.method.clone(), &url)
            .headers(headers);
        if let Some(body) = options.body {
            builder = builder.body(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "Request failed");
                self.notifier.notify(Notification::error(NETWORK_ERROR_MESSAGE));
                return Err(ApiError::Network(e));
            }
        };

        debug!(method = %options.method, url = %url, status = %response.status(), "Response received");

        if response.status() == StatusCode::UNAUTHORIZED && !options.skip_auth {
            self.expire_session(&url);
            return Err(ApiError::SessionExpired);
        }

        Ok(response)
    }

    /// Clear the session after the server rejected our token.
    fn expire_session(&self, url: &str) {
        warn!(url = %url, "Unauthorized response, ending session");
        self.store.clear();
        if let Some(ref user) = self.session_user {
            user.send_replace(None);
        }
        self.notifier.notify(Notification::error(SESSION_EXPIRED_MESSAGE));
        self.navigator.reload(ROOT_PATH);
    }

    pub async fn get(&self, endpoint: &str) -> Result<Response, ApiError> {
        self.request(endpoint, RequestOptions::get()).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Response, ApiError> {
        self.request(endpoint, RequestOptions::delete()).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Response, ApiError> {
        self.request(endpoint, RequestOptions::post().json(body)?).await
    }

    pub async fn put_json<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Response, ApiError> {
        self.request(endpoint, RequestOptions::put().json(body)?).await
    }

    /// GET and parse a JSON body, failing on non-success statuses.
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.send_json(endpoint, RequestOptions::get()).await
    }

    /// Send and parse a JSON body, failing on non-success statuses.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let response = self.request(endpoint, options).await?;
        Self::parse_json(response).await
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}
