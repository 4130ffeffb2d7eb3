use axontrack_respond::ConnectorConfig;
use clap::{ArgAction, Parser, Subcommand};

use crate::cli::{run::RunCommand, schema::SchemaCommand, token::TokenCommand};

pub(crate) fn get_args() -> CliOpts {
    CliOpts::parse()
}

#[derive(Debug, Parser)]
#[command(version = clap::crate_version!(), about = "Axon Respond device location connector")]
pub(crate) struct CliOpts {
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    subcmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the connector once: refresh the token if needed, then sync every device page.
    Run(RunCommand),

    /// Print the connector's configuration or output schema.
    Schema(SchemaCommand),

    /// Inspect or refresh the cached bearer token.
    Token(TokenCommand),
}

impl CliOpts {
    pub(crate) fn verbose(&self) -> u8 {
        self.verbose
    }

    /// `config` is only required by commands that talk to the Respond API.
    pub(crate) async fn run(&self, config: anyhow::Result<ConnectorConfig>) -> anyhow::Result<()> {
        match &self.subcmd {
            Command::Run(cmd) => cmd.run(config?).await,
            Command::Schema(cmd) => cmd.run(),
            Command::Token(cmd) => cmd.run(config?).await,
        }
    }
}
