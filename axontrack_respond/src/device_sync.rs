use std::time::{Duration, Instant};

use axontrack_core::{EphemeralStore, FeatureCollection, FeatureSink};

use crate::{
    RespondError, RespondResult,
    api::DeviceSearchRequest,
    auth::{AuthService, CachedToken, Clock, SystemClock},
    client::RespondClient,
    config::ConnectorConfig,
    transform::transform_page,
};

pub const PAGE_SIZE: u64 = 2000;

/// Every search request asks for the first window; the loop offset only drives
/// termination.
// TODO: send the running offset once the vendor confirms `from` is honoured.
const SEARCH_FROM: u64 = 0;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub pages: usize,
    pub devices_seen: usize,
    pub features_submitted: usize,
    pub total_hits: u64,
    pub elapsed: Duration,
}

pub struct DeviceSync<C, S, K, T = SystemClock>
where
    C: RespondClient,
    S: EphemeralStore,
    K: FeatureSink,
    T: Clock,
{
    auth: AuthService<C, S, T>,
    sink: K,
    config: ConnectorConfig,
}

impl<C, S, K, T> DeviceSync<C, S, K, T>
where
    C: RespondClient,
    S: EphemeralStore,
    K: FeatureSink,
    T: Clock,
{
    pub fn new(auth: AuthService<C, S, T>, sink: K, config: ConnectorConfig) -> Self {
        Self { auth, sink, config }
    }

    pub fn auth(&self) -> &AuthService<C, S, T> {
        &self.auth
    }

    /// One connector run: ensure a token, then fetch, transform and submit page by
    /// page until the reported total is exhausted. Pages submitted before a failure
    /// stay submitted.
    pub async fn run(&self) -> RespondResult<SyncSummary> {
        let started = Instant::now();
        let mut summary = SyncSummary::default();

        if let Err(err) = self.sync_all(&mut summary).await {
            log::error!(
                "device sync aborted after {} pages ({} features submitted): {:?}",
                summary.pages,
                summary.features_submitted,
                err.display_chain()
            );
            return Err(err);
        }

        summary.elapsed = started.elapsed();
        log::info!(
            "device sync finished: {} pages, {} devices, {} features in {:?}",
            summary.pages,
            summary.devices_seen,
            summary.features_submitted,
            summary.elapsed
        );
        Ok(summary)
    }

    async fn sync_all(&self, summary: &mut SyncSummary) -> RespondResult<()> {
        let token = self.auth.ensure_valid_token().await?;

        log::info!("requesting devices");
        let mut from = 0_u64;

        loop {
            let page_features = self.sync_page(&token, from, summary).await?;
            summary.features_submitted += page_features;

            from = from.saturating_add(PAGE_SIZE);
            if summary.total_hits <= from {
                return Ok(());
            }
        }
    }

    async fn sync_page(
        &self,
        token: &CachedToken,
        offset: u64,
        summary: &mut SyncSummary,
    ) -> RespondResult<usize> {
        let request = DeviceSearchRequest {
            from: SEARCH_FROM,
            size: PAGE_SIZE,
        };
        log::debug!("fetching device page at offset {offset}");

        let page = self
            .auth
            .client()
            .search_devices(&token.access_token, request)
            .await?;

        let now = self.auth.clock().now();
        let features = transform_page(&page.data, &self.config, now);
        let submitted = features.len();

        log::debug!(
            "page at offset {offset}: {} of {} devices retained (total hits {})",
            submitted,
            page.data.len(),
            page.meta.total_hits
        );

        self.sink
            .submit(FeatureCollection::new(features))
            .await
            .map_err(RespondError::sink)?;

        summary.pages += 1;
        summary.devices_seen += page.data.len();
        summary.total_hits = page.meta.total_hits;
        Ok(submitted)
    }
}
