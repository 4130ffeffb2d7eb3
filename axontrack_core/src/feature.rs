use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// CoT type for a friendly ground unit; every tracked device is emitted as one.
pub const FRIENDLY_GROUND_UNIT_TYPE: &str = "a-f-G-U-U-L";
/// CoT "how": machine generated, GPS derived.
pub const MACHINE_GPS_HOW: &str = "m-g";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
}

impl Geometry {
    /// GeoJSON axis order: longitude first.
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Self::Point {
            coordinates: [longitude, latitude],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureMetadata {
    #[serde(rename = "partnerName")]
    pub partner_name: String,
    #[serde(rename = "axonDeviceId")]
    pub axon_device_id: String,
    #[serde(rename = "deviceModel")]
    pub device_model: String,
    #[serde(rename = "deviceUpdateTimestamp")]
    pub device_update_timestamp: i64,
    #[serde(rename = "deviceSerial")]
    pub device_serial: String,
    pub location_accuracy: f64,
    pub location_latitude: f64,
    pub location_longitude: f64,
    #[serde(rename = "location_locationUpdateTimestamp")]
    pub location_update_timestamp: i64,
    pub status: String,
    #[serde(rename = "stream_isStreamable")]
    pub stream_is_streamable: bool,
    #[serde(
        rename = "signalStrength",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub signal_strength: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery: Option<i64>,
    #[serde(
        rename = "primary_assignee_firstName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub primary_assignee_first_name: Option<String>,
    #[serde(
        rename = "primary_assignee_lastName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub primary_assignee_last_name: Option<String>,
    #[serde(
        rename = "primary_assignee_badgeNumber",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub primary_assignee_badge_number: Option<String>,
    #[serde(
        rename = "primary_assignee_userId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub primary_assignee_user_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    #[serde(rename = "type")]
    pub cot_type: String,
    pub how: String,
    pub callsign: String,
    pub time: String,
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FeatureStatus>,
    pub remarks: String,
    pub metadata: FeatureMetadata,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct Feature {
    pub id: String,
    pub properties: FeatureProperties,
    pub geometry: Geometry,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[async_trait]
pub trait FeatureSink {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn submit(&self, collection: FeatureCollection) -> Result<(), Self::Error>;
}
