use std::{
    io::{self, Write},
    sync::Mutex,
};

use async_trait::async_trait;
use axontrack_core::{FeatureCollection, FeatureSink};
use reqwest::Client;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("ingestion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ingestion endpoint rejected collection with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("failed to encode feature collection: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write feature collection: {0}")]
    Io(#[from] io::Error),

    #[error("writer lock poisoned")]
    Poisoned,
}

/// Posts each collection as a JSON body to an ingestion endpoint.
#[derive(Clone, Debug)]
pub struct HttpFeatureSink {
    http: Client,
    url: String,
    bearer_token: Option<String>,
}

impl HttpFeatureSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
            bearer_token: None,
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

#[async_trait]
impl FeatureSink for HttpFeatureSink {
    type Error = SinkError;

    async fn submit(&self, collection: FeatureCollection) -> Result<(), Self::Error> {
        let mut request = self.http.post(&self.url).json(&collection);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        log::debug!(
            "submitted {} features to {}",
            collection.len(),
            self.url
        );
        Ok(())
    }
}

/// Writes each collection as one line of JSON.
pub struct WriterFeatureSink<W> {
    writer: Mutex<W>,
}

impl WriterFeatureSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W> WriterFeatureSink<W>
where
    W: Write + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer.into_inner().map_err(|_| SinkError::Poisoned)
    }
}

#[async_trait]
impl<W> FeatureSink for WriterFeatureSink<W>
where
    W: Write + Send,
{
    type Error = SinkError;

    async fn submit(&self, collection: FeatureCollection) -> Result<(), Self::Error> {
        let line = serde_json::to_string(&collection)?;
        let mut writer = self.writer.lock().map_err(|_| SinkError::Poisoned)?;
        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(())
    }
}
