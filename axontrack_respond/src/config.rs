use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    RespondError, RespondResult,
    schema::{self, Shape},
};

pub const DEFAULT_DATA_TIMEOUT_MINUTES: u32 = 5;

/// Client-credentials identity for one agency tenant.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub agency_name: String,
    pub partner_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("agency_name", &self.agency_name)
            .field("partner_id", &self.partner_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectorConfig {
    pub credentials: Credentials,
    pub agency_acronym: Option<String>,
    pub data_timeout_minutes: u32,
    pub debug: bool,
}

impl ConnectorConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            agency_acronym: None,
            data_timeout_minutes: DEFAULT_DATA_TIMEOUT_MINUTES,
            debug: false,
        }
    }

    /// Builds a config from an input object shaped like the connector input schema.
    pub fn from_input(input: Value) -> RespondResult<Self> {
        let input: ConnectorInput = schema::parse_value(Shape::ConnectorInput, input)
            .map_err(|err| match err {
                RespondError::Validation { errors, .. } => {
                    RespondError::InvalidConfig(errors.join("; "))
                }
                RespondError::Decode { source, .. } => RespondError::InvalidConfig(format!(
                    "connector input could not be read: {source}"
                )),
                other => other,
            })?;

        let config = Self {
            credentials: Credentials {
                agency_name: input.agency_name,
                partner_id: input.partner_id,
                client_id: input.client_id,
                client_secret: input.client_secret,
            },
            agency_acronym: input.agency_acronym.filter(|acronym| !acronym.trim().is_empty()),
            data_timeout_minutes: input
                .data_timeout
                .unwrap_or(DEFAULT_DATA_TIMEOUT_MINUTES),
            debug: input.debug.unwrap_or(false),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads the option names verbatim from string variables (e.g. the process
    /// environment), coercing `DataTimeout` and `DEBUG` before schema validation.
    pub fn from_vars<I, K, V>(vars: I) -> RespondResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut input = Map::new();
        for (key, value) in vars {
            let key = key.as_ref();
            if !INPUT_KEYS.contains(&key) {
                continue;
            }
            let raw: String = value.into();
            input.insert(key.to_owned(), coerce_var(key, raw));
        }
        Self::from_input(Value::Object(input))
    }

    pub fn validate(&self) -> RespondResult<()> {
        let credentials = &self.credentials;
        if credentials.agency_name.trim().is_empty() {
            return Err(RespondError::InvalidConfig(
                "AgencyName must be set".to_owned(),
            ));
        }
        if !is_dns_label(&credentials.agency_name) {
            return Err(RespondError::InvalidConfig(format!(
                "AgencyName `{}` is not a valid tenant subdomain",
                credentials.agency_name
            )));
        }
        if credentials.partner_id.trim().is_empty() {
            return Err(RespondError::InvalidConfig("PartnerID must be set".to_owned()));
        }
        if credentials.client_id.trim().is_empty() {
            return Err(RespondError::InvalidConfig("ClientID must be set".to_owned()));
        }
        if credentials.client_secret.trim().is_empty() {
            return Err(RespondError::InvalidConfig(
                "ClientSecret must be set".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn data_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.data_timeout_minutes) * 60)
    }

    /// Empty string when no acronym is configured.
    pub fn acronym(&self) -> &str {
        self.agency_acronym.as_deref().unwrap_or_default()
    }

    pub fn default_base_url(&self) -> String {
        format!("https://{}.evidence.com", self.credentials.agency_name)
    }
}

const INPUT_KEYS: [&str; 7] = [
    "AgencyName",
    "AgencyAcronym",
    "DataTimeout",
    "PartnerID",
    "ClientID",
    "ClientSecret",
    "DEBUG",
];

#[derive(Deserialize)]
struct ConnectorInput {
    #[serde(rename = "AgencyName")]
    agency_name: String,
    #[serde(rename = "AgencyAcronym")]
    agency_acronym: Option<String>,
    #[serde(rename = "DataTimeout")]
    data_timeout: Option<u32>,
    #[serde(rename = "PartnerID")]
    partner_id: String,
    #[serde(rename = "ClientID")]
    client_id: String,
    #[serde(rename = "ClientSecret")]
    client_secret: String,
    #[serde(rename = "DEBUG")]
    debug: Option<bool>,
}

/// Unparseable values are passed through as strings so the schema reports them.
fn coerce_var(key: &str, raw: String) -> Value {
    match key {
        "DataTimeout" => raw
            .trim()
            .parse::<u64>()
            .map(Value::from)
            .unwrap_or(Value::String(raw)),
        "DEBUG" => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Value::Bool(true),
            "false" | "0" | "" => Value::Bool(false),
            _ => Value::String(raw),
        },
        _ => Value::String(raw),
    }
}

fn is_dns_label(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 63
        && !value.starts_with('-')
        && !value.ends_with('-')
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}
