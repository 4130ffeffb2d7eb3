//! Declarative JSON Schemas for every shape crossing the connector boundary.
//!
//! Each schema is defined once and read two ways: compiled into a validator for
//! incoming payloads, and returned verbatim by [`describe`] so hosts can render
//! the connector's configuration form and output layer columns.

use std::{fmt, str::FromStr, sync::OnceLock};

use jsonschema::Validator;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::{RespondError, RespondResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchemaType {
    #[default]
    Input,
    Output,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DataFlow {
    #[default]
    Incoming,
    Outgoing,
}

impl FromStr for SchemaType {
    type Err = RespondError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "input" => Ok(Self::Input),
            "output" => Ok(Self::Output),
            other => Err(RespondError::message(format!("unknown schema type `{other}`"))),
        }
    }
}

impl FromStr for DataFlow {
    type Err = RespondError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "incoming" => Ok(Self::Incoming),
            "outgoing" => Ok(Self::Outgoing),
            other => Err(RespondError::message(format!("unknown data flow `{other}`"))),
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

impl fmt::Display for DataFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incoming => f.write_str("incoming"),
            Self::Outgoing => f.write_str("outgoing"),
        }
    }
}

/// Schema descriptor for the given direction; outgoing flow carries no fields.
pub fn describe(schema_type: SchemaType, flow: DataFlow) -> Value {
    match (flow, schema_type) {
        (DataFlow::Incoming, SchemaType::Input) => input_schema(),
        (DataFlow::Incoming, SchemaType::Output) => output_schema(),
        (DataFlow::Outgoing, _) => json!({ "type": "object", "properties": {} }),
    }
}

pub fn input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "AgencyName": {
                "type": "string",
                "description": "Account Name used to login to evidence.com"
            },
            "AgencyAcronym": {
                "type": "string",
                "description": "Used to prefix the Callsign"
            },
            "DataTimeout": {
                "type": "integer",
                "minimum": 0,
                "maximum": u32::MAX,
                "default": crate::DEFAULT_DATA_TIMEOUT_MINUTES,
                "description": "Get locations updated within the last provided number of minutes"
            },
            "PartnerID": {
                "type": "string",
                "description": "Generated as part of API Access Flow"
            },
            "ClientID": {
                "type": "string",
                "description": "Generated as part of API Access Flow"
            },
            "ClientSecret": {
                "type": "string",
                "description": "Generated as part of API Access Flow"
            },
            "DEBUG": {
                "type": "boolean",
                "default": false,
                "description": "Print results in logs"
            }
        },
        "required": ["AgencyName", "PartnerID", "ClientID", "ClientSecret"]
    })
}

pub fn output_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "partnerName": { "type": "string" },
            "axonDeviceId": { "type": "string" },
            "deviceModel": { "type": "string" },
            "deviceUpdateTimestamp": { "type": "integer" },
            "deviceSerial": { "type": "string" },
            "location_accuracy": { "type": "number" },
            "location_latitude": { "type": "number" },
            "location_longitude": { "type": "number" },
            "location_locationUpdateTimestamp": { "type": "integer" },
            "status": { "type": "string" },
            "stream_isStreamable": { "type": "boolean" },
            "signalStrength": { "type": "string" },
            "battery": { "type": "integer" },
            "primary_assignee_firstName": { "type": "string" },
            "primary_assignee_lastName": { "type": "string" },
            "primary_assignee_badgeNumber": { "type": "string" },
            "primary_assignee_userId": { "type": "string" }
        },
        "required": [
            "partnerName",
            "axonDeviceId",
            "deviceModel",
            "deviceUpdateTimestamp",
            "deviceSerial",
            "location_accuracy",
            "location_latitude",
            "location_longitude",
            "location_locationUpdateTimestamp",
            "status",
            "stream_isStreamable"
        ]
    })
}

pub fn token_response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "access_token": { "type": "string" },
            "token_type": { "type": "string" },
            "expires_in": { "type": "integer" },
            "expires_on": { "type": "integer" },
            "not_before": { "type": "integer" },
            "version": { "type": "string" },
            "entity": {
                "type": "object",
                "properties": {
                    "type": { "type": "string" },
                    "id": { "type": "string" },
                    "partner_id": { "type": "string" }
                },
                "required": ["type", "id", "partner_id"]
            }
        },
        "required": [
            "access_token",
            "token_type",
            "expires_in",
            "expires_on",
            "not_before",
            "version",
            "entity"
        ]
    })
}

pub fn device_search_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "meta": {
                "type": "object",
                "properties": {
                    "correlationId": { "type": "string" },
                    "serverTimestamp": { "type": "integer" },
                    "totalHits": { "type": "integer", "minimum": 0 },
                    "count": { "type": "integer", "minimum": 0 }
                },
                "required": ["correlationId", "serverTimestamp", "totalHits", "count"]
            },
            "data": {
                "type": "array",
                "items": device_record_schema()
            }
        },
        "required": ["meta", "data"]
    })
}

fn device_record_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "partnerId": { "type": "string" },
            "partnerName": { "type": "string" },
            "axonDeviceId": { "type": "string" },
            "deviceModel": { "type": "string" },
            "deviceUpdateTimestamp": { "type": "integer" },
            "attributes": {
                "type": "object",
                "properties": {
                    "deviceSerial": { "type": "string" },
                    "location": {
                        "type": "object",
                        "properties": {
                            "accuracy": { "type": "number" },
                            "latitude": { "type": "number" },
                            "longitude": { "type": "number" },
                            "locationUpdateTimestamp": { "type": "integer" }
                        },
                        "required": ["accuracy", "latitude", "longitude", "locationUpdateTimestamp"]
                    },
                    "status": { "type": "string" },
                    "stream": {
                        "type": "object",
                        "properties": { "isStreamable": { "type": "boolean" } },
                        "required": ["isStreamable"]
                    },
                    "links": {
                        "type": "object",
                        "properties": { "view": { "type": "string" } },
                        "required": ["view"]
                    },
                    "signalStrengths": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": { "signalStrength": { "type": "string" } },
                            "required": ["signalStrength"]
                        }
                    },
                    "batteries": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": { "batteryPercentage": { "type": "integer" } },
                            "required": ["batteryPercentage"]
                        }
                    },
                    "assignees": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "assigneeType": { "type": "string" },
                                "firstName": { "type": "string" },
                                "lastName": { "type": "string" },
                                "badgeNumber": { "type": "string" },
                                "userId": { "type": "string" },
                                "primary": { "type": "boolean" }
                            },
                            "required": [
                                "assigneeType",
                                "firstName",
                                "lastName",
                                "badgeNumber",
                                "userId",
                                "primary"
                            ]
                        }
                    }
                },
                "required": ["deviceSerial", "status", "stream"]
            }
        },
        "required": [
            "partnerId",
            "partnerName",
            "axonDeviceId",
            "deviceModel",
            "deviceUpdateTimestamp",
            "attributes"
        ]
    })
}

/// Payload shapes that are validated before being decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    ConnectorInput,
    TokenResponse,
    DeviceSearch,
}

impl Shape {
    pub fn name(self) -> &'static str {
        match self {
            Self::ConnectorInput => "connector input",
            Self::TokenResponse => "token response",
            Self::DeviceSearch => "device search response",
        }
    }

    fn validator(self) -> &'static Validator {
        static INPUT: OnceLock<Validator> = OnceLock::new();
        static TOKEN: OnceLock<Validator> = OnceLock::new();
        static SEARCH: OnceLock<Validator> = OnceLock::new();

        match self {
            Self::ConnectorInput => INPUT.get_or_init(|| compile(&input_schema())),
            Self::TokenResponse => TOKEN.get_or_init(|| compile(&token_response_schema())),
            Self::DeviceSearch => SEARCH.get_or_init(|| compile(&device_search_schema())),
        }
    }
}

fn compile(schema: &Value) -> Validator {
    Validator::new(schema).expect("static schema compiles")
}

/// Checks `instance` against the shape's schema, reporting every violation with its path.
pub fn validate(shape: Shape, instance: &Value) -> RespondResult<()> {
    let errors: Vec<String> = shape
        .validator()
        .iter_errors(instance)
        .map(|err| {
            let path = err.instance_path.to_string();
            let path = if path.is_empty() { "/".to_owned() } else { path };
            format!("{path}: {err}")
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(RespondError::Validation {
            schema: shape.name(),
            errors,
        })
    }
}

pub fn parse_value<T: DeserializeOwned>(shape: Shape, mut instance: Value) -> RespondResult<T> {
    validate(shape, &instance)?;
    normalize_integers(&mut instance);
    serde_json::from_value(instance).map_err(|source| RespondError::Decode {
        schema: shape.name(),
        source,
    })
}

/// Rewrites integral floats (`4500.0`) as integers. The schema's `integer` type
/// accepts them, so decoding must too.
fn normalize_integers(value: &mut Value) {
    match value {
        Value::Number(number) if !number.is_i64() && !number.is_u64() => {
            if let Some(float) = number.as_f64()
                && float.fract() == 0.0
                && float >= i64::MIN as f64
                && float < i64::MAX as f64
            {
                *value = Value::from(float as i64);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_integers),
        Value::Object(fields) => fields.values_mut().for_each(normalize_integers),
        _ => {}
    }
}

pub fn parse_body<T: DeserializeOwned>(shape: Shape, body: &[u8]) -> RespondResult<T> {
    let instance: Value =
        serde_json::from_slice(body).map_err(|err| RespondError::Validation {
            schema: shape.name(),
            errors: vec![format!("/: body is not valid JSON ({err})")],
        })?;
    parse_value(shape, instance)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{DataFlow, SchemaType, Shape, describe, parse_body, parse_value, validate};
    use crate::{DeviceSearchResponse, RespondError, TokenResponse};

    fn token_json() -> serde_json::Value {
        json!({
            "access_token": "abc",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_on": 1_700_003_600_000_i64,
            "not_before": 1_700_000_000_000_i64,
            "version": "2",
            "entity": { "type": "partner", "id": "e-1", "partner_id": "p-1" }
        })
    }

    #[test]
    fn describe_selects_by_direction_and_type() {
        let input = describe(SchemaType::Input, DataFlow::Incoming);
        assert!(input["properties"]["AgencyName"].is_object());
        assert_eq!(input["properties"]["DataTimeout"]["default"], 5);

        let output = describe(SchemaType::Output, DataFlow::Incoming);
        assert!(output["properties"]["primary_assignee_userId"].is_object());

        let outgoing = describe(SchemaType::Output, DataFlow::Outgoing);
        assert_eq!(outgoing, json!({ "type": "object", "properties": {} }));
    }

    #[test]
    fn parses_valid_token_response() {
        let body = serde_json::to_vec(&token_json()).expect("encode");
        let token: TokenResponse = parse_body(Shape::TokenResponse, &body).expect("valid token");
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.entity.partner_id, "p-1");
    }

    #[test]
    fn reports_offending_field_path() {
        let mut value = token_json();
        value["expires_on"] = json!("soon");

        let err = validate(Shape::TokenResponse, &value).expect_err("should fail");
        let RespondError::Validation { schema, errors } = err else {
            panic!("expected validation error");
        };
        assert_eq!(schema, "token response");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("/expires_on"), "{errors:?}");
    }

    #[test]
    fn missing_nested_field_is_rejected() {
        let mut value = token_json();
        value["entity"]
            .as_object_mut()
            .expect("entity object")
            .remove("partner_id");

        let err = validate(Shape::TokenResponse, &value).expect_err("should fail");
        assert!(err.to_string().contains("partner_id"));
    }

    #[test]
    fn non_json_body_is_a_validation_error() {
        let err = parse_body::<TokenResponse>(Shape::TokenResponse, b"<html>")
            .expect_err("html is not a token");
        assert!(matches!(err, RespondError::Validation { .. }));
    }

    #[test]
    fn device_with_null_location_is_rejected() {
        let value = json!({
            "meta": { "correlationId": "c", "serverTimestamp": 1, "totalHits": 1, "count": 1 },
            "data": [{
                "partnerId": "p",
                "partnerName": "Springfield PD",
                "axonDeviceId": "d-1",
                "deviceModel": "AB4",
                "deviceUpdateTimestamp": 1,
                "attributes": {
                    "deviceSerial": "s",
                    "location": null,
                    "status": "ON_DUTY",
                    "stream": { "isStreamable": false }
                }
            }]
        });

        let err = validate(Shape::DeviceSearch, &value).expect_err("null location");
        assert!(err.to_string().contains("/data/0/attributes/location"));
    }

    #[test]
    fn integral_floats_decode_as_integers() {
        let value = json!({
            "meta": {
                "correlationId": "c",
                "serverTimestamp": 1_700_000_000_000.0,
                "totalHits": 4500.0,
                "count": 1.0
            },
            "data": [{
                "partnerId": "p",
                "partnerName": "Springfield PD",
                "axonDeviceId": "d-1",
                "deviceModel": "AB4",
                "deviceUpdateTimestamp": 1_700_000_000_000.0,
                "attributes": {
                    "deviceSerial": "s",
                    "location": {
                        "accuracy": 3,
                        "latitude": 39.0,
                        "longitude": -89.65,
                        "locationUpdateTimestamp": 1_700_000_000_000.0
                    },
                    "status": "ON_DUTY",
                    "stream": { "isStreamable": false },
                    "batteries": [{ "batteryPercentage": 72.0 }]
                }
            }]
        });

        let page: DeviceSearchResponse =
            parse_value(Shape::DeviceSearch, value).expect("integral floats should decode");
        assert_eq!(page.meta.total_hits, 4500);
        assert_eq!(page.meta.count, 1);
        let attributes = &page.data[0].attributes;
        assert_eq!(attributes.first_battery().map(|b| b.battery_percentage), Some(72));
        let location = attributes.location.as_ref().expect("location");
        assert_eq!(location.location_update_timestamp, 1_700_000_000_000);
        assert_eq!(location.latitude, 39.0);
        assert_eq!(location.accuracy, 3.0);
    }

    #[test]
    fn fractional_integer_field_is_a_validation_error() {
        let mut value = token_json();
        value["expires_in"] = json!(3600.5);

        let err = parse_value::<TokenResponse>(Shape::TokenResponse, value)
            .expect_err("fractional expiry");
        assert!(err.to_string().contains("/expires_in"), "{err}");
    }

    #[test]
    fn schema_names_parse_case_insensitively() {
        assert_eq!("Output".parse::<SchemaType>().expect("parse"), SchemaType::Output);
        assert_eq!("OUTGOING".parse::<DataFlow>().expect("parse"), DataFlow::Outgoing);
        assert!("sideways".parse::<DataFlow>().is_err());
    }
}
