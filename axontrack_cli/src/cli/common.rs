use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::Context;
use axontrack_app::ConnectorTask;
use axontrack_core::{FeatureSink, Timestamp};
use axontrack_respond::{CachedToken, ConnectorConfig, HttpRespondClient};
use axontrack_store::SqliteEphemeralStore;
use clap::Args;

pub(crate) const DEFAULT_DB: &str = "axontrack.sqlite";

#[derive(Debug, Args)]
pub(crate) struct StoreArgs {
    /// SQLite file holding the cached token slot.
    #[arg(long, default_value = DEFAULT_DB)]
    pub(crate) db: PathBuf,

    /// Layer the token slot belongs to.
    #[arg(long, default_value = axontrack_store::DEFAULT_LAYER)]
    pub(crate) layer: String,

    /// Override the Respond API host, e.g. for a staging tenant.
    #[arg(long)]
    pub(crate) base_url: Option<String>,
}

pub(crate) fn load_config() -> anyhow::Result<ConnectorConfig> {
    ConnectorConfig::from_vars(env::vars())
        .context("failed to load connector configuration from environment")
}

/// `DEBUG` in the connector config raises the floor to info so response bodies are shown.
pub(crate) fn log_level(verbose: u8, config: Option<&ConnectorConfig>) -> u8 {
    if config.is_some_and(|config| config.debug) {
        verbose.max(1)
    } else {
        verbose
    }
}

pub(crate) async fn build_task<K>(
    config: ConnectorConfig,
    store_args: &StoreArgs,
    sink: K,
) -> anyhow::Result<ConnectorTask<HttpRespondClient, SqliteEphemeralStore, K>>
where
    K: FeatureSink,
{
    let mut client =
        HttpRespondClient::new(&config).context("failed to create Respond API client")?;
    if let Some(base_url) = &store_args.base_url {
        client = client.with_base_url(base_url);
    }

    let store = connect_store(&store_args.db, &store_args.layer).await?;
    log::debug!(
        "using token slot `{}` in {}",
        store.layer(),
        store_args.db.display()
    );

    Ok(ConnectorTask::new(config, client, store, sink)?)
}

async fn connect_store(db: &Path, layer: &str) -> anyhow::Result<SqliteEphemeralStore> {
    SqliteEphemeralStore::connect(db, layer)
        .await
        .with_context(|| format!("failed to open ephemeral store {}", db.display()))
}

pub(crate) fn print_token_details(token: &CachedToken, valid: bool, now: Timestamp) {
    let valid_for = token.expires_at.signed_duration_since(now).num_seconds();

    println!(
        "Valid until: {} ({})",
        token.expires_at,
        if valid_for >= 0 {
            format!("in {valid_for}s")
        } else {
            format!("expired {}s ago", -valid_for)
        }
    );
    println!("Usable: {}", if valid { "yes" } else { "no, refresh required" });
}

#[cfg(test)]
mod tests {
    use axontrack_respond::ConnectorConfig;

    use super::log_level;

    fn config(debug: &str) -> ConnectorConfig {
        ConnectorConfig::from_vars([
            ("AgencyName", "springfield"),
            ("PartnerID", "partner"),
            ("ClientID", "client"),
            ("ClientSecret", "secret"),
            ("DEBUG", debug),
        ])
        .expect("valid config")
    }

    #[test]
    fn debug_config_raises_log_floor_to_info() {
        assert_eq!(log_level(0, Some(&config("true"))), 1);
        assert_eq!(log_level(3, Some(&config("1"))), 3);
    }

    #[test]
    fn verbosity_is_kept_without_debug() {
        assert_eq!(log_level(0, Some(&config("false"))), 0);
        assert_eq!(log_level(2, None), 2);
    }
}
