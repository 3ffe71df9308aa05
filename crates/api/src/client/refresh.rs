//! Session renewal after an authorization failure

use super::error::ClientError;
use super::retry::RefreshMode;
use super::{ApiClient, error_from_response, read_json};
use crate::session::SessionState;
use crate::types::{RefreshRequest, SessionEnvelope};
use tracing::{debug, info, warn};

impl ApiClient {
    /// Obtain a new session after a 401 on a request sent with `stale_token`
    ///
    /// On failure the stored session is expired and the returned error is
    /// terminal for the calling request.
    pub(crate) async fn renew_session(&self, stale_token: Option<&str>) -> Result<(), ClientError> {
        let _guard = match self.refresh_mode {
            RefreshMode::Independent => None,
            RefreshMode::Coalesced => {
                let guard = self.refresh_lock.lock().await;
                let current = self.store.access_token();
                if current.is_some()
                    && current.as_deref() != stale_token
                    && self.store.refresh_token().is_some()
                {
                    debug!("Session was renewed by a concurrent request");
                    return Ok(());
                }
                Some(guard)
            }
        };

        let Some(refresh_token) = self.store.refresh_token() else {
            warn!("Authorization failed and no refresh token is stored");
            self.expire_session();
            return Err(ClientError::Unauthorized(
                "no refresh token available".to_string(),
            ));
        };

        match self.refresh_tokens(&refresh_token).await {
            Ok(()) => {
                info!("Session renewed");
                self.signal.publish(SessionState::Active);
                Ok(())
            }
            Err(e) => {
                warn!("Session refresh failed: {e}");
                self.expire_session();
                Err(ClientError::RefreshFailed(Box::new(e)))
            }
        }
    }

    /// Call the refresh endpoint directly, bypassing the pipeline, and store
    /// the returned session
    async fn refresh_tokens(&self, refresh_token: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .post(format!("{}/refresh", self.auth_base))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let envelope: SessionEnvelope = serde_json::from_value(read_json(response).await?)?;
        self.store.store_tokens(&envelope.session)?;
        Ok(())
    }
}
