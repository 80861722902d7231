//! Profile query
//!
//! Sends the one fixed GraphQL document with the session token as a bearer
//! credential and decodes the answer into a [`ProfileData`].

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{QueryError, StorageError};
use crate::metrics::ProfileMetrics;
use crate::profile::ProfileData;
use crate::session::{Redirect, SessionGuard, SessionState, SessionToken};
use crate::slot::TokenSlot;

/// Event ids whose level entries are requested.
pub const TRACKED_EVENT_IDS: [u32; 4] = [72, 20, 250, 763];

/// Event path the server-side xp sum is scoped to.
pub const MODULE_EVENT_PATH: &str = "/bahrain/bh-module";

pub const PROFILE_QUERY: &str = r#"
query User {
  user {
    auditRatio
    email
    firstName
    lastName
    login
    totalDown
    totalUp
  }
  audit {
    auditorLogin
    closureType
    result {
      path
    }
  }
  event_user(where: { eventId: { _in: [72, 20, 250, 763] } }) {
    level
    userId
    userLogin
    eventId
  }
  transaction {
    amount
    path
    type
    userLogin
    eventId
  }
  transaction_aggregate(
    where: {
      event: { path: { _eq: "/bahrain/bh-module" } }
      type: { _eq: "xp" }
    }
  ) {
    aggregate {
      sum {
        amount
      }
    }
  }
}
"#;

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    data: Option<ProfileData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone)]
pub struct QueryClient {
    client: Client,
    endpoint: String,
}

impl QueryClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
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

    /// Fetch the profile document. A response without `data` is an error,
    /// never a partially filled document.
    pub async fn fetch_profile(&self, token: &SessionToken) -> Result<ProfileData, QueryError> {
        debug!("Querying profile at {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", token.as_str()))
            .header(CONTENT_TYPE, "application/json")
            .json(&QueryRequest {
                query: PROFILE_QUERY,
            })
            .send()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;

        let parsed: QueryResponse = serde_json::from_slice(&body).map_err(|e| {
            QueryError::InvalidResponse(format!("status {}: {}", status, e))
        })?;

        match parsed.data {
            Some(data) => {
                debug!(
                    "Profile loaded: {} audits, {} transactions",
                    data.audit.len(),
                    data.transaction.len()
                );
                Ok(data)
            }
            None => {
                let messages: Vec<String> =
                    parsed.errors.into_iter().map(|e| e.message).collect();
                warn!("Profile query returned no data ({})", status);
                Err(QueryError::Rejected(messages))
            }
        }
    }
}

/// What a profile visit ends in.
#[derive(Debug)]
pub enum ProfileOutcome {
    Loaded(ProfileMetrics),
    /// The stored session was missing, malformed or expired. No query was sent.
    Redirect(Redirect),
    /// The query failed; nothing from the response is shown.
    Unavailable(QueryError),
}

/// Gate on the stored session, then query once and aggregate once.
///
/// Only slot failures are returned as errors.
pub async fn load_profile<S: TokenSlot>(
    guard: &SessionGuard<S>,
    query: &QueryClient,
    now: i64,
) -> Result<ProfileOutcome, StorageError> {
    let token = match guard.require_valid_session(now)? {
        SessionState::Active(token) => token,
        SessionState::Redirect(target) => return Ok(ProfileOutcome::Redirect(target)),
    };

    Ok(match query.fetch_profile(&token).await {
        Ok(data) => ProfileOutcome::Loaded(ProfileMetrics::from_profile(&data)),
        Err(e) => ProfileOutcome::Unavailable(e),
    })
}
