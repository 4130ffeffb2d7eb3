#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("store error: {0}")]
    Store(#[from] axontrack_store::StoreError),

    #[error("respond error: {0}")]
    Respond(#[from] axontrack_respond::RespondError),

    #[error("sink error: {0}")]
    Sink(#[from] crate::SinkError),
}
