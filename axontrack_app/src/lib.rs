mod error;
mod sink;
mod task;

pub use error::AppError;
pub use sink::{HttpFeatureSink, SinkError, WriterFeatureSink};
pub use task::{ConnectorTask, Invocation, TASK_IDENTITY, TaskIdentity, TokenStatus};
