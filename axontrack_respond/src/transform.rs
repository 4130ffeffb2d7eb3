use std::fmt;

use axontrack_core::{
    Feature, FeatureMetadata, FeatureProperties, FeatureStatus, Geometry, Timestamp,
    feature::{FRIENDLY_GROUND_UNIT_TYPE, MACHINE_GPS_HOW},
};

use crate::{
    api::{DeviceLocation, DeviceRecord},
    config::ConnectorConfig,
};

/// Charging devices report this status and are never tracked.
pub const DOCKED_STATUS: &str = "DOCKED";
const UNKNOWN_CALLSIGN: &str = "Unknown User";
const UNKNOWN_NAME: &str = "Unknown";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exclusion {
    Docked,
    NoLocation,
    StaleFix,
    UnrepresentableFix,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Docked => f.write_str("docked"),
            Self::NoLocation => f.write_str("no location"),
            Self::StaleFix => f.write_str("stale location fix"),
            Self::UnrepresentableFix => f.write_str("unrepresentable fix timestamp"),
        }
    }
}

/// Applies the exclusion rules in order, returning the usable location and its fix time.
pub fn check_record<'a>(
    record: &'a DeviceRecord,
    config: &ConnectorConfig,
    now: Timestamp,
) -> Result<(&'a DeviceLocation, Timestamp), Exclusion> {
    let attributes = &record.attributes;
    if attributes.status == DOCKED_STATUS {
        return Err(Exclusion::Docked);
    }

    let location = attributes.location.as_ref().ok_or(Exclusion::NoLocation)?;

    let cutoff_millis = now
        .as_epoch_millis()
        .saturating_sub(config.data_timeout().as_millis() as i64);
    if location.location_update_timestamp < cutoff_millis {
        return Err(Exclusion::StaleFix);
    }

    let fixed_at = Timestamp::from_epoch_millis(location.location_update_timestamp)
        .ok_or(Exclusion::UnrepresentableFix)?;

    Ok((location, fixed_at))
}

pub fn to_feature(record: &DeviceRecord, config: &ConnectorConfig, now: Timestamp) -> Option<Feature> {
    match check_record(record, config, now) {
        Ok((location, fixed_at)) => Some(build_feature(record, location, fixed_at, config, now)),
        Err(exclusion) => {
            log::trace!("skipping device {}: {exclusion}", record.axon_device_id);
            None
        }
    }
}

pub fn transform_page(
    records: &[DeviceRecord],
    config: &ConnectorConfig,
    now: Timestamp,
) -> Vec<Feature> {
    records
        .iter()
        .filter_map(|record| to_feature(record, config, now))
        .collect()
}

fn build_feature(
    record: &DeviceRecord,
    location: &DeviceLocation,
    fixed_at: Timestamp,
    config: &ConnectorConfig,
    now: Timestamp,
) -> Feature {
    let attributes = &record.attributes;
    let primary = attributes.primary_assignee();

    let callsign = match primary {
        Some(assignee) => {
            let initial: String = assignee.first_name.chars().take(1).collect();
            format!("{} {initial}. {}", config.acronym(), assignee.last_name)
                .trim()
                .to_owned()
        }
        None => UNKNOWN_CALLSIGN.to_owned(),
    };

    let display_name = match primary {
        Some(assignee) => format!("{} {}", assignee.first_name, assignee.last_name),
        None => UNKNOWN_NAME.to_owned(),
    };
    let remarks = format!("Agency: {}\nName: {display_name}", record.partner_name);

    let battery = attributes.first_battery().map(|b| b.battery_percentage);

    Feature {
        id: record.axon_device_id.clone(),
        properties: FeatureProperties {
            cot_type: FRIENDLY_GROUND_UNIT_TYPE.to_owned(),
            how: MACHINE_GPS_HOW.to_owned(),
            callsign,
            time: now.to_rfc3339(),
            start: fixed_at.to_rfc3339(),
            status: battery.map(|percentage| FeatureStatus {
                battery: Some(percentage.to_string()),
            }),
            remarks,
            metadata: FeatureMetadata {
                partner_name: record.partner_name.clone(),
                axon_device_id: record.axon_device_id.clone(),
                device_model: record.device_model.clone(),
                device_update_timestamp: record.device_update_timestamp,
                device_serial: attributes.device_serial.clone(),
                location_accuracy: location.accuracy,
                location_latitude: location.latitude,
                location_longitude: location.longitude,
                location_update_timestamp: location.location_update_timestamp,
                status: attributes.status.clone(),
                stream_is_streamable: attributes.stream.is_streamable,
                signal_strength: attributes
                    .first_signal_strength()
                    .map(|s| s.signal_strength.clone()),
                battery,
                primary_assignee_first_name: primary.map(|a| a.first_name.clone()),
                primary_assignee_last_name: primary.map(|a| a.last_name.clone()),
                primary_assignee_badge_number: primary.map(|a| a.badge_number.clone()),
                primary_assignee_user_id: primary.map(|a| a.user_id.clone()),
            },
        },
        geometry: Geometry::point(location.longitude, location.latitude),
    }
}

#[cfg(test)]
mod tests {
    use axontrack_core::{Geometry, Timestamp};

    use super::{Exclusion, check_record, to_feature, transform_page};
    use crate::{
        api::{
            Assignee, Battery, DeviceAttributes, DeviceLocation, DeviceRecord, DeviceStream,
            SignalStrength,
        },
        config::{ConnectorConfig, Credentials},
    };

    const NOW_MILLIS: i64 = 1_700_000_000_000;

    fn config(acronym: Option<&str>) -> ConnectorConfig {
        let mut config = ConnectorConfig::new(Credentials {
            agency_name: "springfield".to_owned(),
            partner_id: "partner".to_owned(),
            client_id: "client".to_owned(),
            client_secret: "secret".to_owned(),
        });
        config.agency_acronym = acronym.map(ToOwned::to_owned);
        config
    }

    fn now() -> Timestamp {
        Timestamp::from_epoch_millis(NOW_MILLIS).expect("valid millis")
    }

    fn assignee(first: &str, last: &str, primary: bool) -> Assignee {
        Assignee {
            assignee_type: "USER".to_owned(),
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            badge_number: format!("B-{last}"),
            user_id: format!("u-{first}"),
            primary,
        }
    }

    fn device(status: &str, fix_age_millis: Option<i64>) -> DeviceRecord {
        DeviceRecord {
            partner_id: "partner".to_owned(),
            partner_name: "Springfield PD".to_owned(),
            axon_device_id: "dev-1".to_owned(),
            device_model: "AXON_BODY_4".to_owned(),
            device_update_timestamp: NOW_MILLIS - 1_000,
            attributes: DeviceAttributes {
                device_serial: "X1234".to_owned(),
                location: fix_age_millis.map(|age| DeviceLocation {
                    accuracy: 4.5,
                    latitude: 39.78,
                    longitude: -89.65,
                    location_update_timestamp: NOW_MILLIS - age,
                }),
                status: status.to_owned(),
                stream: DeviceStream {
                    is_streamable: true,
                },
                links: None,
                signal_strengths: None,
                batteries: None,
                assignees: None,
            },
        }
    }

    #[test]
    fn docked_devices_are_excluded_even_with_fresh_fix() {
        let record = device("DOCKED", Some(0));
        assert_eq!(
            check_record(&record, &config(None), now()).map(|_| ()),
            Err(Exclusion::Docked)
        );
        assert!(to_feature(&record, &config(None), now()).is_none());
    }

    #[test]
    fn devices_without_location_are_excluded() {
        let record = device("ON_DUTY", None);
        assert_eq!(
            check_record(&record, &config(None), now()).map(|_| ()),
            Err(Exclusion::NoLocation)
        );
    }

    #[test]
    fn stale_fix_is_excluded_and_boundary_is_retained() {
        let five_minutes = 5 * 60 * 1_000;

        let stale = device("ON_DUTY", Some(five_minutes + 1));
        assert_eq!(
            check_record(&stale, &config(None), now()).map(|_| ()),
            Err(Exclusion::StaleFix)
        );

        let boundary = device("ON_DUTY", Some(five_minutes));
        assert!(to_feature(&boundary, &config(None), now()).is_some());
    }

    #[test]
    fn data_timeout_is_configurable() {
        let mut config = config(None);
        config.data_timeout_minutes = 30;
        let record = device("ON_DUTY", Some(20 * 60 * 1_000));
        assert!(to_feature(&record, &config, now()).is_some());
    }

    #[test]
    fn callsign_uses_acronym_and_primary_initial() {
        let mut record = device("ON_DUTY", Some(0));
        record.attributes.assignees = Some(vec![
            assignee("Bob", "Smith", false),
            assignee("Jane", "Doe", true),
            assignee("Ann", "Other", true),
        ]);

        let with_acronym = to_feature(&record, &config(Some("PD")), now()).expect("feature");
        assert_eq!(with_acronym.properties.callsign, "PD J. Doe");
        assert_eq!(
            with_acronym.properties.remarks,
            "Agency: Springfield PD\nName: Jane Doe"
        );
        let metadata = &with_acronym.properties.metadata;
        assert_eq!(metadata.primary_assignee_first_name.as_deref(), Some("Jane"));
        assert_eq!(metadata.primary_assignee_badge_number.as_deref(), Some("B-Doe"));
        assert_eq!(metadata.primary_assignee_user_id.as_deref(), Some("u-Jane"));

        let without_acronym = to_feature(&record, &config(None), now()).expect("feature");
        assert_eq!(without_acronym.properties.callsign, "J. Doe");
    }

    #[test]
    fn no_primary_assignee_yields_unknown_identity() {
        let mut record = device("ON_DUTY", Some(0));
        record.attributes.assignees = Some(vec![assignee("Bob", "Smith", false)]);

        let feature = to_feature(&record, &config(Some("PD")), now()).expect("feature");
        assert_eq!(feature.properties.callsign, "Unknown User");
        assert_eq!(
            feature.properties.remarks,
            "Agency: Springfield PD\nName: Unknown"
        );
        assert!(feature.properties.metadata.primary_assignee_last_name.is_none());

        record.attributes.assignees = None;
        let feature = to_feature(&record, &config(None), now()).expect("feature");
        assert_eq!(feature.properties.callsign, "Unknown User");
    }

    #[test]
    fn zero_assignees_yield_unknown_user() {
        let mut record = device("ON_DUTY", Some(0));
        record.attributes.assignees = Some(Vec::new());

        let feature = to_feature(&record, &config(Some("PD")), now()).expect("feature");
        assert_eq!(feature.properties.callsign, "Unknown User");
        assert_eq!(
            feature.properties.remarks,
            "Agency: Springfield PD\nName: Unknown"
        );
        let metadata = &feature.properties.metadata;
        assert!(metadata.primary_assignee_first_name.is_none());
        assert!(metadata.primary_assignee_user_id.is_none());
    }

    #[test]
    fn battery_is_reported_only_when_present() {
        let mut record = device("ON_DUTY", Some(0));
        record.attributes.batteries = Some(vec![
            Battery {
                battery_percentage: 72,
            },
            Battery {
                battery_percentage: 10,
            },
        ]);

        let feature = to_feature(&record, &config(None), now()).expect("feature");
        let status = feature.properties.status.as_ref().expect("status present");
        assert_eq!(status.battery.as_deref(), Some("72"));
        assert_eq!(feature.properties.metadata.battery, Some(72));

        record.attributes.batteries = Some(vec![]);
        let feature = to_feature(&record, &config(None), now()).expect("feature");
        assert!(feature.properties.status.is_none());
        assert!(feature.properties.metadata.battery.is_none());

        let value = serde_json::to_value(&feature).expect("serialize");
        assert!(value["properties"].get("status").is_none());
        assert!(value["properties"]["metadata"].get("battery").is_none());
    }

    #[test]
    fn geometry_and_timestamps_follow_the_fix() {
        let mut record = device("ON_DUTY", Some(60_000));
        record.attributes.signal_strengths = Some(vec![SignalStrength {
            signal_strength: "GOOD".to_owned(),
        }]);

        let feature = to_feature(&record, &config(None), now()).expect("feature");
        assert_eq!(feature.id, "dev-1");
        assert_eq!(feature.geometry, Geometry::point(-89.65, 39.78));
        assert_eq!(feature.properties.cot_type, "a-f-G-U-U-L");
        assert_eq!(feature.properties.how, "m-g");
        assert_eq!(feature.properties.time, "2023-11-14T22:13:20.000Z");
        assert_eq!(feature.properties.start, "2023-11-14T22:12:20.000Z");

        let metadata = &feature.properties.metadata;
        assert_eq!(metadata.signal_strength.as_deref(), Some("GOOD"));
        assert_eq!(metadata.location_update_timestamp, NOW_MILLIS - 60_000);
        assert_eq!(metadata.device_serial, "X1234");
        assert!(metadata.stream_is_streamable);
    }

    #[test]
    fn transform_page_keeps_only_retained_records() {
        let records = vec![
            device("DOCKED", Some(0)),
            device("ON_DUTY", None),
            device("ON_DUTY", Some(0)),
        ];
        let features = transform_page(&records, &config(None), now());
        assert_eq!(features.len(), 1);
    }
}
