//! Authentication API client methods

use super::error::ClientError;
use super::request::ApiRequest;
use super::{ApiClient, backend_message_or, read_json};
use crate::session::SessionState;
use crate::types::{AuthResponse, LoginRequest, SignupRequest};
use reqwest::Method;
use serde::Serialize;
use tracing::{info, warn};

impl ApiClient {
    /// Register a new account and store the returned session
    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, ClientError> {
        let response = self
            .authenticate("/signup", request, "Registration failed")
            .await?;
        info!(username = %request.username, "Signed up");
        Ok(response)
    }

    /// Log in with email and password and store the returned session
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        let response = self.authenticate("/login", request, "Login failed").await?;
        info!(email = %request.email, "Logged in");
        Ok(response)
    }

    /// End the session
    ///
    /// The backend call goes through the authenticated pipeline and its
    /// failure is only logged; the stored tokens are removed either way.
    pub async fn logout(&self) -> Result<(), ClientError> {
        if let Err(e) = self
            .execute_value(ApiRequest::auth(Method::POST, "/logout"))
            .await
        {
            warn!("Logout request failed: {e}");
        }

        self.store.clear_tokens()?;
        self.signal.publish(SessionState::LoggedOut);
        info!("Logged out");
        Ok(())
    }

    /// Whether a complete session is stored
    pub fn is_authenticated(&self) -> bool {
        self.store.has_session()
    }

    /// Unauthenticated POST to the auth service that yields a session
    async fn authenticate<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<AuthResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}{path}", self.auth_base))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_message_or(response, fallback).await);
        }

        let auth: AuthResponse = serde_json::from_value(read_json(response).await?)?;
        if let Some(session) = &auth.session {
            self.store.store_tokens(session)?;
            self.signal.publish(SessionState::Active);
        }
        Ok(auth)
    }
}
