//! Profile Insight client
//!
//! Wires the sign-in endpoint, the GraphQL endpoint and the on-disk session
//! slot together for the CLI commands.

use anyhow::{Context, Result};
use chrono::Utc;
use profile_insight::{
    load_profile, AuthClient, Config, LoginError, ProfileOutcome, QueryClient, SessionGuard,
    SessionToken, SqliteSlot,
};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ProfileClient {
    auth: AuthClient,
    query: QueryClient,
    guard: SessionGuard<SqliteSlot>,
    session_path: PathBuf,
}

impl ProfileClient {
    pub fn from_config(
        config: &Config,
        auth_url: Option<&str>,
        graphql_url: Option<&str>,
    ) -> Result<Self> {
        let auth_url = auth_url.map(str::to_string).unwrap_or_else(|| config.auth_url());
        let graphql_url = graphql_url
            .map(str::to_string)
            .unwrap_or_else(|| config.graphql_url());

        let session_path = config.session_path()?;
        debug!("Session database: {}", session_path.display());
        let slot = SqliteSlot::open(&session_path).with_context(|| {
            format!("Failed to open session database {}", session_path.display())
        })?;

        Ok(Self {
            auth: AuthClient::new(&auth_url, config.timeout()),
            query: QueryClient::new(&graphql_url, config.timeout()),
            guard: SessionGuard::new(slot),
            session_path,
        })
    }

    pub fn auth_endpoint(&self) -> &str {
        self.auth.endpoint()
    }

    pub fn graphql_endpoint(&self) -> &str {
        self.query.endpoint()
    }

    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    pub fn guard(&self) -> &SessionGuard<SqliteSlot> {
        &self.guard
    }

    pub async fn login(&self, identifier: &str, password: &str) -> Result<SessionToken, LoginError> {
        self.auth.login(&self.guard, identifier, password).await
    }

    pub async fn load_metrics(&self) -> Result<ProfileOutcome> {
        let outcome = load_profile(&self.guard, &self.query, Utc::now().timestamp()).await?;
        Ok(outcome)
    }
}
