pub mod ephemeral;
pub mod feature;
pub mod time;

pub use ephemeral::{EphemeralState, EphemeralStore, MemoryEphemeralStore};
pub use feature::{
    Feature, FeatureCollection, FeatureMetadata, FeatureProperties, FeatureSink, FeatureStatus,
    Geometry,
};
pub use time::Timestamp;
