use axontrack_core::{EphemeralStore, Timestamp};

use super::types::{CachedToken, REFRESH_SKEW};
use crate::{RespondError, RespondResult, client::RespondClient, config::Credentials};

pub trait Clock {
    fn now(&self) -> Timestamp;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

pub struct AuthService<C, S, T = SystemClock>
where
    C: RespondClient,
    S: EphemeralStore,
    T: Clock,
{
    client: C,
    store: S,
    credentials: Credentials,
    clock: T,
}

impl<C, S, T> AuthService<C, S, T>
where
    C: RespondClient,
    S: EphemeralStore,
    T: Clock,
{
    pub fn with_clock(client: C, store: S, credentials: Credentials, clock: T) -> Self {
        Self {
            client,
            store,
            credentials,
            clock,
        }
    }

    pub async fn cached_token(&self) -> RespondResult<Option<CachedToken>> {
        let state = self
            .store
            .load_ephemeral()
            .await
            .map_err(RespondError::store)?;
        Ok(CachedToken::from_ephemeral(&state))
    }

    /// Returns the cached token, exchanging credentials for a new one when it is
    /// absent or expires within the refresh skew.
    pub async fn ensure_valid_token(&self) -> RespondResult<CachedToken> {
        let now = self.clock.now();
        if let Some(token) = self.cached_token().await? {
            if !token.should_refresh(now, REFRESH_SKEW) {
                log::debug!("reusing cached token valid until {}", token.expires_at);
                return Ok(token);
            }
            log::debug!("cached token expires at {}; refreshing", token.expires_at);
        }

        self.refresh().await
    }

    pub async fn refresh(&self) -> RespondResult<CachedToken> {
        log::info!("requesting new token");
        let response = self.client.request_token(&self.credentials).await?;

        let expires_at = Timestamp::from_epoch_millis(response.expires_on).ok_or_else(|| {
            RespondError::Validation {
                schema: "token response",
                errors: vec![format!(
                    "/expires_on: {} is not a representable instant",
                    response.expires_on
                )],
            }
        })?;

        let token = CachedToken {
            access_token: response.access_token,
            expires_at,
        };

        self.store
            .save_ephemeral(&token.to_ephemeral())
            .await
            .map_err(RespondError::store)?;

        Ok(token)
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &T {
        &self.clock
    }
}
