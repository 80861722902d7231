//! Session guard
//!
//! Owns the token slot and decides, without contacting the server, whether
//! the held token can still be used. Every decision ends in either a usable
//! token or a redirect target for the caller to act on.

use std::fmt;

use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::slot::TokenSlot;
use crate::token::{self, Claims};

/// Opaque session credential. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decoded claims, if the token is well formed.
    pub fn claims(&self) -> Option<Claims> {
        token::decode(&self.0).ok()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(<{} bytes>)", self.0.len())
    }
}

/// Where the caller should go next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    Login,
    Profile,
}

/// Result of gating the profile flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Active(SessionToken),
    Redirect(Redirect),
}

pub struct SessionGuard<S> {
    slot: S,
}

impl<S: TokenSlot> SessionGuard<S> {
    pub fn new(slot: S) -> Self {
        Self { slot }
    }

    /// Token currently held in the slot, with one layer of storage quoting removed.
    pub fn current_token(&self) -> Result<Option<SessionToken>, StorageError> {
        let raw = match self.slot.get()? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let unquoted = strip_quotes(&raw);
        if unquoted.is_empty() {
            return Ok(None);
        }
        Ok(Some(SessionToken::new(unquoted)))
    }

    /// Gate for the profile flow. Unusable tokens are cleared from the slot.
    pub fn require_valid_session(&self, now: i64) -> Result<SessionState, StorageError> {
        let token = match self.current_token()? {
            Some(token) => token,
            None => {
                debug!("No session token held");
                self.slot.remove()?;
                return Ok(SessionState::Redirect(Redirect::Login));
            }
        };

        match token::decode(token.as_str()) {
            Ok(claims) if !token::is_expired(&claims, now) => Ok(SessionState::Active(token)),
            Ok(claims) => {
                warn!("Session token expired at {}, clearing", claims.exp);
                self.slot.remove()?;
                Ok(SessionState::Redirect(Redirect::Login))
            }
            Err(e) => {
                warn!("Discarding unusable session token: {}", e);
                self.slot.remove()?;
                Ok(SessionState::Redirect(Redirect::Login))
            }
        }
    }

    /// Login entry check: a still-valid session skips straight to the profile.
    /// Leaves the slot untouched either way.
    pub fn login_entry(&self, now: i64) -> Result<Option<Redirect>, StorageError> {
        let valid = self
            .current_token()?
            .and_then(|t| t.claims())
            .is_some_and(|claims| !token::is_expired(&claims, now));
        Ok(valid.then_some(Redirect::Profile))
    }

    pub fn logout(&self) -> Result<Redirect, StorageError> {
        self.slot.remove()?;
        info!("Logged out, session cleared");
        Ok(Redirect::Login)
    }

    /// Store a freshly issued token verbatim.
    pub fn complete_login(&self, raw_token: &str) -> Result<Redirect, StorageError> {
        self.slot.set(raw_token)?;
        info!("Session token stored");
        Ok(Redirect::Profile)
    }
}

/// Remove exactly one matching pair of surrounding double quotes.
fn strip_quotes(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(raw)
}
