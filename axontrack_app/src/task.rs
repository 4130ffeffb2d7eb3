use std::path::Path;

use axontrack_core::{EphemeralStore, FeatureSink, Timestamp};
use axontrack_respond::{
    AuthService, CachedToken, Clock, ConnectorConfig, DataFlow, DeviceSync, HttpRespondClient,
    RespondClient, SchemaType, SyncSummary, SystemClock, is_valid, schema,
};
use axontrack_store::SqliteEphemeralStore;
use serde_json::Value;

use crate::AppError;

/// How the host may start the connector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Invocation {
    Schedule,
}

/// Static registration data the host reads before any invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskIdentity {
    pub name: &'static str,
    pub flows: &'static [DataFlow],
    pub invocations: &'static [Invocation],
}

pub const TASK_IDENTITY: TaskIdentity = TaskIdentity {
    name: "etl-axon",
    flows: &[DataFlow::Incoming],
    invocations: &[Invocation::Schedule],
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenStatus {
    pub token: Option<CachedToken>,
    pub valid: bool,
    pub checked_at: Timestamp,
}

/// One connector invocation: built from config plus its collaborators, then
/// driven through `control`.
pub struct ConnectorTask<C, S, K, T = SystemClock>
where
    C: RespondClient,
    S: EphemeralStore,
    K: FeatureSink,
    T: Clock,
{
    sync: DeviceSync<C, S, K, T>,
}

impl<K> ConnectorTask<HttpRespondClient, SqliteEphemeralStore, K, SystemClock>
where
    K: FeatureSink,
{
    pub async fn connect(
        config: ConnectorConfig,
        database_path: impl AsRef<Path>,
        layer: &str,
        sink: K,
    ) -> Result<Self, AppError> {
        let client = HttpRespondClient::new(&config)?;
        let store = SqliteEphemeralStore::connect(database_path, layer).await?;
        Self::new(config, client, store, sink)
    }
}

impl<C, S, K> ConnectorTask<C, S, K, SystemClock>
where
    C: RespondClient,
    S: EphemeralStore,
    K: FeatureSink,
{
    pub fn new(config: ConnectorConfig, client: C, store: S, sink: K) -> Result<Self, AppError> {
        Self::with_clock(config, client, store, sink, SystemClock)
    }
}

impl<C, S, K, T> ConnectorTask<C, S, K, T>
where
    C: RespondClient,
    S: EphemeralStore,
    K: FeatureSink,
    T: Clock,
{
    pub fn with_clock(
        config: ConnectorConfig,
        client: C,
        store: S,
        sink: K,
        clock: T,
    ) -> Result<Self, AppError> {
        config.validate()?;
        let auth = AuthService::with_clock(client, store, config.credentials.clone(), clock);
        Ok(Self {
            sync: DeviceSync::new(auth, sink, config),
        })
    }

    /// Schema descriptor for the host: input or output for incoming data, and an
    /// empty object for the outgoing direction.
    pub fn schema(schema_type: SchemaType, flow: DataFlow) -> Value {
        schema::describe(schema_type, flow)
    }

    pub fn identity() -> TaskIdentity {
        TASK_IDENTITY
    }

    pub async fn control(&self) -> Result<SyncSummary, AppError> {
        let summary = self.sync.run().await?;
        Ok(summary)
    }

    pub async fn token_status(&self) -> Result<TokenStatus, AppError> {
        let auth = self.sync.auth();
        let token = auth.cached_token().await?;
        let checked_at = auth.clock().now();
        let valid = is_valid(token.as_ref(), checked_at);
        Ok(TokenStatus {
            token,
            valid,
            checked_at,
        })
    }

    /// Exchanges credentials unconditionally and overwrites the cached token.
    pub async fn refresh_token(&self) -> Result<CachedToken, AppError> {
        let token = self.sync.auth().refresh().await?;
        Ok(token)
    }

    pub fn store(&self) -> &S {
        self.sync.auth().store()
    }
}
