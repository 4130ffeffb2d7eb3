mod ephemeral;
mod error;

pub use ephemeral::{DEFAULT_LAYER, EphemeralEntry, SqliteEphemeralStore};
pub use error::StoreError;
