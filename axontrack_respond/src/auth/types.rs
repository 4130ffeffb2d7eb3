use std::time::Duration;

use axontrack_core::{EphemeralState, Timestamp};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const ACCESS_TOKEN_EXPIRES_KEY: &str = "access_token_expires";

/// Tokens expiring within this window are treated as already stale.
pub const REFRESH_SKEW: Duration = Duration::from_secs(60);

#[derive(Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at: Timestamp,
}

impl CachedToken {
    /// Reads the token slot; a missing key or unparseable expiry yields `None`.
    pub fn from_ephemeral(state: &EphemeralState) -> Option<Self> {
        let access_token = state.get(ACCESS_TOKEN_KEY)?;
        if access_token.is_empty() {
            return None;
        }

        let expires_millis = state.get(ACCESS_TOKEN_EXPIRES_KEY)?.trim().parse::<i64>().ok()?;
        let expires_at = Timestamp::from_epoch_millis(expires_millis)?;

        Some(Self {
            access_token: access_token.clone(),
            expires_at,
        })
    }

    pub fn to_ephemeral(&self) -> EphemeralState {
        EphemeralState::from([
            (ACCESS_TOKEN_KEY.to_owned(), self.access_token.clone()),
            (
                ACCESS_TOKEN_EXPIRES_KEY.to_owned(),
                self.expires_at.as_epoch_millis().to_string(),
            ),
        ])
    }

    pub fn should_refresh(&self, now: Timestamp, refresh_skew: Duration) -> bool {
        match now.checked_add(refresh_skew) {
            Some(deadline) => self.expires_at <= deadline,
            None => true,
        }
    }
}

impl std::fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

pub fn is_valid(cached: Option<&CachedToken>, now: Timestamp) -> bool {
    cached.is_some_and(|token| !token.should_refresh(now, REFRESH_SKEW))
}
