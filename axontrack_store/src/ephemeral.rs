use std::{path::Path, time::Duration};

use async_trait::async_trait;
use axontrack_core::{EphemeralState, EphemeralStore, Timestamp};
use futures_util::TryStreamExt;
use sqlx::{
    FromRow, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
};

use crate::StoreError;

pub const DEFAULT_LAYER: &str = "axon-respond";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EphemeralEntry {
    pub key: String,
    pub value: String,
    pub updated_at: Timestamp,
}

/// Per-layer key/value slot persisted across connector invocations.
#[derive(Clone)]
pub struct SqliteEphemeralStore {
    pool: SqlitePool,
    layer: String,
}

impl SqliteEphemeralStore {
    pub async fn connect(
        database_path: impl AsRef<Path>,
        layer: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let connect_options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(connect_options)
            .await?;

        sqlx::migrate!().run(&pool).await?;

        Self::from_pool(pool, layer)
    }

    pub fn from_pool(pool: SqlitePool, layer: impl Into<String>) -> Result<Self, StoreError> {
        let layer = layer.into();
        if layer.trim().is_empty() {
            return Err(StoreError::EmptyLayer);
        }
        Ok(Self { pool, layer })
    }

    pub fn layer(&self) -> &str {
        &self.layer
    }

    /// Shares the pool with another layer's slot.
    pub fn for_layer(&self, layer: impl Into<String>) -> Result<Self, StoreError> {
        Self::from_pool(self.pool.clone(), layer)
    }

    pub async fn entries(&self) -> Result<Vec<EphemeralEntry>, StoreError> {
        let mut rows = sqlx::query_as::<_, DbEphemeralRow>(
            r#"
            SELECT key, value, updated_at_epoch_millis
            FROM ephemeral
            WHERE layer = ?1
            ORDER BY key ASC
            "#,
        )
        .bind(&self.layer)
        .fetch(&self.pool);

        let mut entries = Vec::new();
        while let Some(row) = rows.try_next().await? {
            entries.push(EphemeralEntry::try_from(row)?);
        }

        Ok(entries)
    }

    pub async fn load(&self) -> Result<EphemeralState, StoreError> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect())
    }

    pub async fn save(&self, state: &EphemeralState) -> Result<(), StoreError> {
        self.save_at(state, Timestamp::now()).await
    }

    pub async fn save_at(
        &self,
        state: &EphemeralState,
        updated_at: Timestamp,
    ) -> Result<(), StoreError> {
        let updated_at_epoch_millis = updated_at.as_epoch_millis();
        let mut tx = self.pool.begin().await?;

        for (key, value) in state {
            sqlx::query(
                r#"
                INSERT INTO ephemeral (layer, key, value, updated_at_epoch_millis)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT (layer, key) DO UPDATE SET
                    value = excluded.value,
                    updated_at_epoch_millis = excluded.updated_at_epoch_millis
                "#,
            )
            .bind(&self.layer)
            .bind(key)
            .bind(value)
            .bind(updated_at_epoch_millis)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl EphemeralStore for SqliteEphemeralStore {
    type Error = StoreError;

    async fn load_ephemeral(&self) -> Result<EphemeralState, Self::Error> {
        self.load().await
    }

    async fn save_ephemeral(&self, state: &EphemeralState) -> Result<(), Self::Error> {
        self.save(state).await
    }
}

#[derive(Debug, FromRow)]
struct DbEphemeralRow {
    key: String,
    value: String,
    updated_at_epoch_millis: i64,
}

impl TryFrom<DbEphemeralRow> for EphemeralEntry {
    type Error = StoreError;

    fn try_from(row: DbEphemeralRow) -> Result<Self, Self::Error> {
        Ok(Self {
            key: row.key,
            value: row.value,
            updated_at: Timestamp::from_epoch_millis(row.updated_at_epoch_millis)
                .ok_or(StoreError::InvalidEpochMillis(row.updated_at_epoch_millis))?,
        })
    }
}
