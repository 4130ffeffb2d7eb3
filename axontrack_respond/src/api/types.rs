use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub id: String,
    pub partner_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    /// Epoch milliseconds.
    pub expires_on: i64,
    pub not_before: i64,
    pub version: String,
    pub entity: TokenEntity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSearchRequest {
    pub from: u64,
    pub size: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMeta {
    pub correlation_id: String,
    pub server_timestamp: i64,
    pub total_hits: u64,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceSearchResponse {
    pub meta: SearchMeta,
    pub data: Vec<DeviceRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub partner_id: String,
    pub partner_name: String,
    pub axon_device_id: String,
    pub device_model: String,
    pub device_update_timestamp: i64,
    pub attributes: DeviceAttributes,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAttributes {
    pub device_serial: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<DeviceLocation>,
    pub status: String,
    pub stream: DeviceStream,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<DeviceLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_strengths: Option<Vec<SignalStrength>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batteries: Option<Vec<Battery>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<Assignee>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceLocation {
    pub accuracy: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Epoch milliseconds of the fix.
    pub location_update_timestamp: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStream {
    pub is_streamable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceLinks {
    pub view: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalStrength {
    pub signal_strength: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Battery {
    pub battery_percentage: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    pub assignee_type: String,
    pub first_name: String,
    pub last_name: String,
    pub badge_number: String,
    pub user_id: String,
    pub primary: bool,
}

impl DeviceAttributes {
    /// First assignee flagged primary, in source order.
    pub fn primary_assignee(&self) -> Option<&Assignee> {
        self.assignees
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|assignee| assignee.primary)
    }

    pub fn first_battery(&self) -> Option<&Battery> {
        self.batteries.as_deref().and_then(<[Battery]>::first)
    }

    pub fn first_signal_strength(&self) -> Option<&SignalStrength> {
        self.signal_strengths
            .as_deref()
            .and_then(<[SignalStrength]>::first)
    }
}
