mod types;

pub use types::{
    Assignee, Battery, DeviceAttributes, DeviceLinks, DeviceLocation, DeviceRecord,
    DeviceSearchRequest, DeviceSearchResponse, DeviceStream, SearchMeta, SignalStrength,
    TokenEntity, TokenResponse,
};
