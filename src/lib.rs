//! Profile Insight - Session-gated XP and audit metrics
//!
//! Signs a learner in to the platform, keeps the issued session token, and
//! turns the profile GraphQL document into the metrics shown on the profile.
//!
//! # How it works
//!
//! 1. The user signs in with identifier + password (Basic auth); the raw token is stored
//! 2. Each profile visit checks the stored token locally (no server round-trip)
//! 3. Expired or malformed tokens are cleared and the user is sent back to login
//! 4. A valid token is sent as a bearer credential with one fixed GraphQL query
//! 5. The response is reduced to audit counts, level, per-project XP and module XP
//!
//! # Metric rules
//!
//! - Audits done by the user themselves never count
//! - Repeated audits of the same result path count once
//! - Project XP sums `xp` transactions by the last path segment, highest first
//! - Module XP comes from the server-side aggregate, shown in thousands

pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod profile;
pub mod query;
pub mod session;
pub mod slot;
pub mod token;

pub use auth::{basic_credentials, AuthClient};
pub use config::Config;
pub use error::{DecodeError, LoginError, QueryError, StorageError};
pub use metrics::{AuditCounts, ProfileMetrics, ProjectXp, ResolvedLevel};
pub use profile::ProfileData;
pub use query::{load_profile, ProfileOutcome, QueryClient};
pub use session::{Redirect, SessionGuard, SessionState, SessionToken};
pub use slot::{MemorySlot, SqliteSlot, TokenSlot};
pub use token::Claims;
