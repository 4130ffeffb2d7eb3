use axontrack_app::WriterFeatureSink;
use axontrack_respond::ConnectorConfig;
use clap::{Args, Subcommand};

use crate::cli::common::{StoreArgs, build_task, print_token_details};

#[derive(Debug, Args)]
pub(crate) struct TokenCommand {
    #[command(subcommand)]
    subcmd: TokenSubcommand,
}

#[derive(Debug, Subcommand)]
enum TokenSubcommand {
    /// Show the cached token and whether the next run can reuse it.
    Status(StatusCommand),

    /// Exchange credentials now and overwrite the cached token.
    Refresh(RefreshCommand),
}

impl TokenCommand {
    pub(crate) async fn run(&self, config: ConnectorConfig) -> anyhow::Result<()> {
        match &self.subcmd {
            TokenSubcommand::Status(cmd) => cmd.run(config).await,
            TokenSubcommand::Refresh(cmd) => cmd.run(config).await,
        }
    }
}

#[derive(Debug, Args)]
struct StatusCommand {
    #[command(flatten)]
    store: StoreArgs,
}

impl StatusCommand {
    async fn run(&self, config: ConnectorConfig) -> anyhow::Result<()> {
        let task = build_task(config, &self.store, WriterFeatureSink::stdout()).await?;
        let status = task.token_status().await?;

        println!("Layer: {}", self.store.layer);
        match &status.token {
            Some(token) => print_token_details(token, status.valid, status.checked_at),
            None => println!("No cached token; the next run will request one."),
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
struct RefreshCommand {
    #[command(flatten)]
    store: StoreArgs,
}

impl RefreshCommand {
    async fn run(&self, config: ConnectorConfig) -> anyhow::Result<()> {
        let task = build_task(config, &self.store, WriterFeatureSink::stdout()).await?;
        let token = task.refresh_token().await?;
        let status = task.token_status().await?;

        println!("Layer: {}", self.store.layer);
        print_token_details(&token, status.valid, status.checked_at);
        Ok(())
    }
}
