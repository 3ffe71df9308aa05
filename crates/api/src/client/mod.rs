//! Authenticated SkillSwap API client
//!
//! Every call made through [`ApiClient::execute`] carries the stored access
//! token as a bearer credential. A 401 triggers one session refresh followed
//! by a replay of the original request, bounded by the [`RetryPolicy`].
//! When authorization cannot be recovered the stored session is cleared and
//! [`SessionState::Expired`] is published.

pub mod auth;
pub mod chat;
pub mod error;
pub mod friendships;
pub mod notifications;
pub mod posts;
mod refresh;
pub mod request;
pub mod retry;
pub mod skills;
pub mod users;

use crate::config::ClientConfig;
use crate::session::{MemorySessionStore, SessionSignal, SessionState, SessionStore};
use error::ClientError;
use request::{ApiRequest, Endpoint};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode, header};
use retry::{RefreshMode, RetryPolicy};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

/// SkillSwap API client
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    api_base: String,
    auth_base: String,
    login_route: String,
    retry: RetryPolicy,
    refresh_mode: RefreshMode,
    store: Arc<dyn SessionStore>,
    signal: SessionSignal,
    refresh_lock: Arc<Mutex<()>>,
}

impl ApiClient {
    /// Create a client for the given API base address with an in-memory store
    pub fn new(api_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().api_url(api_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Resource API base address
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Auth service base address
    pub fn auth_base(&self) -> &str {
        &self.auth_base
    }

    /// Session storage shared with this client
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Current session state
    pub fn session_state(&self) -> SessionState {
        self.signal.state()
    }

    /// Subscribe to session state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.signal.subscribe()
    }

    /// Execute a request through the authenticated pipeline and decode the
    /// JSON reply
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let value = self.execute_value(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Execute a request through the authenticated pipeline
    pub async fn execute_value(&self, request: ApiRequest) -> Result<Value, ClientError> {
        let response = self.send_authorized(&request, |builder| builder).await?;
        if response.status().is_success() {
            read_json(response).await
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// Send `request` with the stored bearer token, renewing the session and
    /// replaying on 401 while the retry policy allows
    ///
    /// Returns the first response that is not a 401, whatever its status.
    async fn send_authorized(
        &self,
        request: &ApiRequest,
        prepare: impl Fn(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response, ClientError> {
        let mut attempt = 1;
        loop {
            let token = self.store.access_token();
            let response = prepare(self.build_request(request, token.as_deref()))
                .send()
                .await?;
            let status = response.status();
            debug!(
                method = %request.method(),
                path = request.endpoint().path(),
                attempt,
                status = status.as_u16(),
                "Backend replied"
            );

            if status != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }

            if !self.retry.allows_retry(attempt) {
                let reason = backend_message(response)
                    .await
                    .unwrap_or_else(|| format!("request rejected after {attempt} attempt(s)"));
                warn!(
                    path = request.endpoint().path(),
                    "Authorization failed with retries exhausted"
                );
                self.expire_session();
                return Err(ClientError::Unauthorized(reason));
            }

            attempt += 1;
            self.renew_session(token.as_deref()).await?;
        }
    }

    fn build_request(&self, request: &ApiRequest, token: Option<&str>) -> RequestBuilder {
        let base = match request.endpoint() {
            Endpoint::Api(_) => &self.api_base,
            Endpoint::Auth(_) => &self.auth_base,
        };
        let url = format!("{base}{}", request.endpoint().path());

        let mut builder = self.http.request(request.method().clone(), url);
        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Drop the stored session and tell subscribers to send the user to login
    fn expire_session(&self) {
        if let Err(e) = self.store.clear_tokens() {
            warn!("Failed to clear stored session: {e}");
        }
        self.signal.publish(SessionState::Expired {
            redirect_to: self.login_route.clone(),
        });
    }
}

/// Builder for [`ApiClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    config: ClientConfig,
    store: Option<Arc<dyn SessionStore>>,
}

impl ApiClientBuilder {
    /// Replace the whole configuration
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the resource API base address
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the auth service base address
    pub fn auth_url(mut self, url: impl Into<String>) -> Self {
        self.config.auth_url = Some(url.into());
        self
    }

    /// Set the session store
    pub fn store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the retry policy
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    /// Set how concurrent refreshes are shared
    pub fn refresh_mode(mut self, mode: RefreshMode) -> Self {
        self.config.refresh_mode = mode;
        self
    }

    /// Set the request timeout
    ///
    /// Sub-millisecond remainders round up; a zero duration fails `build`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_ms =
            Some(u64::try_from(timeout.as_micros().div_ceil(1000)).unwrap_or(u64::MAX));
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let config = self.config;
        config.validate()?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let mut client_builder = ClientBuilder::new()
            .default_headers(headers)
            .user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            client_builder = client_builder.timeout(timeout);
        }
        let http = client_builder.build()?;

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemorySessionStore::new()));
        let initial = if store.has_session() {
            SessionState::Active
        } else {
            SessionState::LoggedOut
        };

        Ok(ApiClient {
            http,
            api_base: config.api_base(),
            auth_base: config.auth_base(),
            login_route: config.login_route,
            retry: config.retry,
            refresh_mode: config.refresh_mode,
            store,
            signal: SessionSignal::new(initial),
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }
}

/// Decode a successful reply; an absent body is an error
pub(crate) async fn read_json(response: Response) -> Result<Value, ClientError> {
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ClientError::EmptyResponse);
    }
    let value: Value = serde_json::from_slice(&bytes)?;
    if value.is_null() {
        return Err(ClientError::EmptyResponse);
    }
    Ok(value)
}

/// Map an error reply to the backend's message, or to the raw status error
pub(crate) async fn error_from_response(response: Response) -> ClientError {
    let status = response.status();
    let status_error = response.error_for_status_ref().err();

    match (backend_message(response).await, status_error) {
        (Some(message), _) => ClientError::BackendMessage {
            status: status.as_u16(),
            message,
        },
        (None, Some(err)) => ClientError::Transport(err),
        (None, None) => ClientError::BackendMessage {
            status: status.as_u16(),
            message: status.to_string(),
        },
    }
}

/// The backend's message for an error reply, or `fallback` when it sent none
pub(crate) async fn backend_message_or(response: Response, fallback: &str) -> ClientError {
    let status = response.status().as_u16();
    let message = backend_message(response)
        .await
        .unwrap_or_else(|| fallback.to_string());
    ClientError::BackendMessage { status, message }
}

/// The `error` field of a JSON error body, if there is one
async fn backend_message(response: Response) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    let bytes = response.bytes().await.ok()?;
    serde_json::from_slice::<ErrorBody>(&bytes)
        .ok()
        .map(|body| body.error)
        .filter(|message| !message.trim().is_empty())
}

/// Percent-encode an identifier for use as a path segment
pub(crate) fn segment(id: impl Display) -> String {
    urlencoding::encode(&id.to_string()).into_owned()
}
