use anyhow::Context;
use axontrack_app::{HttpFeatureSink, WriterFeatureSink};
use axontrack_core::FeatureSink;
use axontrack_respond::ConnectorConfig;
use clap::Args;

use crate::cli::common::{StoreArgs, build_task};

#[derive(Debug, Args)]
pub(crate) struct RunCommand {
    #[command(flatten)]
    store: StoreArgs,

    /// Ingestion endpoint receiving each page's feature collection; stdout when omitted.
    #[arg(long)]
    sink: Option<String>,

    /// Bearer token sent to the ingestion endpoint.
    #[arg(long, requires = "sink")]
    sink_token: Option<String>,
}

impl RunCommand {
    pub(crate) async fn run(&self, config: ConnectorConfig) -> anyhow::Result<()> {
        match &self.sink {
            Some(url) => {
                let mut sink = HttpFeatureSink::new(url);
                if let Some(token) = &self.sink_token {
                    sink = sink.with_bearer_token(token);
                }
                self.run_with(config, sink).await
            }
            None => self.run_with(config, WriterFeatureSink::stdout()).await,
        }
    }

    async fn run_with<K>(&self, config: ConnectorConfig, sink: K) -> anyhow::Result<()>
    where
        K: FeatureSink,
    {
        let task = build_task(config, &self.store, sink).await?;
        let summary = task.control().await.context("connector run failed")?;

        eprintln!(
            "Synced {} pages: {} of {} devices submitted (total hits {}) in {:?}",
            summary.pages,
            summary.features_submitted,
            summary.devices_seen,
            summary.total_hits,
            summary.elapsed
        );
        Ok(())
    }
}
