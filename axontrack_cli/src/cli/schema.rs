use axontrack_app::TASK_IDENTITY;
use axontrack_respond::{DataFlow, SchemaType, schema};
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct SchemaCommand {
    /// `input` (configuration) or `output` (feature metadata).
    #[arg(long = "type", default_value = "input")]
    schema_type: SchemaType,

    /// `incoming` or `outgoing`.
    #[arg(long, default_value = "incoming")]
    flow: DataFlow,
}

impl SchemaCommand {
    pub(crate) fn run(&self) -> anyhow::Result<()> {
        log::info!(
            "{} schema (flows {:?}, invocations {:?})",
            TASK_IDENTITY.name,
            TASK_IDENTITY.flows,
            TASK_IDENTITY.invocations
        );
        let descriptor = schema::describe(self.schema_type, self.flow);
        println!("{}", serde_json::to_string_pretty(&descriptor)?);
        Ok(())
    }
}
