pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod device_sync;
pub mod errors;
pub mod schema;
pub mod transform;

pub use api::{
    Assignee, Battery, DeviceAttributes, DeviceLocation, DeviceRecord, DeviceSearchRequest,
    DeviceSearchResponse, SearchMeta, TokenResponse,
};
pub use auth::{AuthService, CachedToken, Clock, SystemClock, is_valid};
pub use client::{HttpRespondClient, RespondClient};
pub use config::{ConnectorConfig, Credentials, DEFAULT_DATA_TIMEOUT_MINUTES};
pub use device_sync::{DeviceSync, PAGE_SIZE, SyncSummary};
pub use errors::{RespondError, RespondResult};
pub use schema::{DataFlow, SchemaType};
pub use transform::{Exclusion, to_feature, transform_page};
