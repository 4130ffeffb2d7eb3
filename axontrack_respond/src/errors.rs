use std::fmt;

use thiserror::Error;

pub type RespondResult<T> = Result<T, RespondError>;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum RespondError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("token exchange rejected with status {status}: {body}")]
    Auth { status: u16, body: String },
    #[error("device search rejected with status {status}: {body}")]
    Fetch { status: u16, body: String },
    #[error("{schema} failed validation: {}", .errors.join("; "))]
    Validation {
        schema: &'static str,
        errors: Vec<String>,
    },
    #[error("{operation} request failed")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{schema} could not be decoded after validation")]
    Decode {
        schema: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("ephemeral store operation failed")]
    Store(#[source] BoxError),
    #[error("feature sink rejected submission")]
    Sink(#[source] BoxError),
    #[error("{0}")]
    Message(String),
}

impl RespondError {
    pub fn message(msg: impl Into<String>) -> Self {
        Self::Message(msg.into())
    }

    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Store(Box::new(err))
    }

    pub fn sink(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Sink(Box::new(err))
    }

    pub fn display_chain(&self) -> DisplayChainedError<'_> {
        DisplayChainedError { inner: self }
    }
}

pub struct DisplayChainedError<'a> {
    inner: &'a (dyn std::error::Error + 'static),
}

impl fmt::Debug for DisplayChainedError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(self.inner);

        while let Some(err) = current {
            if first {
                first = false;
            } else {
                write!(f, " -> ")?;
            }

            write!(f, "{err}")?;
            current = err.source();
        }

        Ok(())
    }
}

impl fmt::Display for DisplayChainedError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
