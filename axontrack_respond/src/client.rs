use async_trait::async_trait;
use reqwest::{Client, header};

use crate::{
    RespondError, RespondResult,
    api::{DeviceSearchRequest, DeviceSearchResponse, TokenResponse},
    config::{ConnectorConfig, Credentials},
    schema::{self, Shape},
};

const TOKEN_PATH: &str = "/api/oauth2/token";
const DEVICE_SEARCH_PATH: &str = "/respond/api/v1/devices/states/search";
const USER_AGENT: &str = concat!("axontrack/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait RespondClient {
    async fn request_token(&self, credentials: &Credentials) -> RespondResult<TokenResponse>;

    async fn search_devices(
        &self,
        access_token: &str,
        request: DeviceSearchRequest,
    ) -> RespondResult<DeviceSearchResponse>;
}

#[derive(Clone, Debug)]
pub struct HttpRespondClient {
    http: Client,
    base_url: String,
    verbose: bool,
}

impl HttpRespondClient {
    pub fn new(config: &ConnectorConfig) -> RespondResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| RespondError::Transport {
                operation: "http client setup",
                source,
            })?;

        Ok(Self {
            http,
            base_url: config.default_base_url(),
            verbose: config.debug,
        })
    }

    /// Points the client at another host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl RespondClient for HttpRespondClient {
    async fn request_token(&self, credentials: &Credentials) -> RespondResult<TokenResponse> {
        let form = [
            ("grant_type", "client_credentials"),
            ("partner_id", credentials.partner_id.as_str()),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(self.url(TOKEN_PATH))
            .form(&form)
            .send()
            .await
            .map_err(|source| RespondError::Transport {
                operation: "token exchange",
                source,
            })?;

        let status = response.status();
        let body = read_body(response, "token exchange").await?;
        log::debug!("token exchange responded with status {status}");

        if !status.is_success() {
            return Err(RespondError::Auth {
                status: status.as_u16(),
                body: lossy(&body),
            });
        }

        schema::parse_body(Shape::TokenResponse, &body)
    }

    async fn search_devices(
        &self,
        access_token: &str,
        request: DeviceSearchRequest,
    ) -> RespondResult<DeviceSearchResponse> {
        let response = self
            .http
            .post(self.url(DEVICE_SEARCH_PATH))
            .header(header::ACCEPT, "application/json")
            .header("Client-Type", "EXTERNAL")
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await
            .map_err(|source| RespondError::Transport {
                operation: "device search",
                source,
            })?;

        let status = response.status();
        let body = read_body(response, "device search").await?;

        if self.verbose {
            log::info!("device search response ({status}): {}", lossy(&body));
        }

        if !status.is_success() {
            return Err(RespondError::Fetch {
                status: status.as_u16(),
                body: lossy(&body),
            });
        }

        schema::parse_body(Shape::DeviceSearch, &body)
    }
}

async fn read_body(response: reqwest::Response, operation: &'static str) -> RespondResult<Vec<u8>> {
    let bytes = response
        .bytes()
        .await
        .map_err(|source| RespondError::Transport { operation, source })?;
    Ok(bytes.to_vec())
}

fn lossy(body: &[u8]) -> String {
    String::from_utf8_lossy(body).into_owned()
}
