//! Credential exchange
//!
//! Trades an identifier and password for a session token at the sign-in
//! endpoint, then hands the token to the session guard.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::LoginError;
use crate::session::{SessionGuard, SessionToken};
use crate::slot::TokenSlot;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Value for a `Basic` Authorization header.
pub fn basic_credentials(identifier: &str, secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", identifier, secret)))
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    client: Client,
    endpoint: String,
}

impl AuthClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        // Fall back to a default client if the builder fails
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request a token. Empty inputs are rejected before anything is sent.
    ///
    /// The token is the raw response body, quotes included.
    pub async fn request_token(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<SessionToken, LoginError> {
        if identifier.is_empty() {
            return Err(LoginError::EmptyIdentifier);
        }
        if secret.is_empty() {
            return Err(LoginError::EmptyPassword);
        }

        debug!("Signing in at {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, basic_credentials(identifier, secret))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| LoginError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            debug!("Sign-in rejected with status {}", status);
            return Err(LoginError::InvalidCredentials);
        }

        let raw = response
            .text()
            .await
            .map_err(|e| LoginError::Transport(e.to_string()))?;

        Ok(SessionToken::new(raw))
    }

    /// Sign in and store the issued token.
    ///
    /// The slot keeps the response body verbatim. The returned token is the
    /// unquoted form the guard presents as a bearer credential.
    pub async fn login<S: TokenSlot>(
        &self,
        guard: &SessionGuard<S>,
        identifier: &str,
        secret: &str,
    ) -> Result<SessionToken, LoginError> {
        let issued = self.request_token(identifier, secret).await?;
        guard.complete_login(issued.as_str())?;
        info!("Signed in as {}", identifier);
        Ok(guard.current_token()?.unwrap_or(issued))
    }
}
