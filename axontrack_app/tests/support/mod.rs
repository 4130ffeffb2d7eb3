use std::{
    convert::Infallible,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axontrack_app::ConnectorTask;
use axontrack_core::{FeatureCollection, FeatureSink, Timestamp};
use axontrack_respond::{ConnectorConfig, Credentials, HttpRespondClient};
use axontrack_store::SqliteEphemeralStore;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::MockServer;

pub const LAYER: &str = "axon-respond";

pub type HttpTask = ConnectorTask<HttpRespondClient, SqliteEphemeralStore, RecordingSink>;

#[derive(Clone, Default)]
pub struct RecordingSink {
    collections: Arc<Mutex<Vec<FeatureCollection>>>,
}

impl RecordingSink {
    pub fn collections(&self) -> Vec<FeatureCollection> {
        self.collections.lock().expect("collections lock").clone()
    }
}

#[async_trait]
impl FeatureSink for RecordingSink {
    type Error = Infallible;

    async fn submit(&self, collection: FeatureCollection) -> Result<(), Self::Error> {
        self.collections
            .lock()
            .expect("collections lock")
            .push(collection);
        Ok(())
    }
}

pub struct TestHarness {
    _temp_dir: TempDir,
    db_path: PathBuf,
    pub server: MockServer,
    pub sink: RecordingSink,
}

impl TestHarness {
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let db_path = temp_dir.path().join("ephemeral.sqlite");
        Self {
            _temp_dir: temp_dir,
            db_path,
            server: MockServer::start().await,
            sink: RecordingSink::default(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub async fn store(&self) -> SqliteEphemeralStore {
        SqliteEphemeralStore::connect(self.db_path(), LAYER)
            .await
            .expect("connect store")
    }

    pub async fn task(&self) -> HttpTask {
        self.task_with(config()).await
    }

    pub async fn task_with(&self, config: ConnectorConfig) -> HttpTask {
        let client = HttpRespondClient::new(&config)
            .expect("client")
            .with_base_url(self.server.uri());
        ConnectorTask::new(config, client, self.store().await, self.sink.clone()).expect("task")
    }
}

pub fn config() -> ConnectorConfig {
    let mut config = ConnectorConfig::new(Credentials {
        agency_name: "springfield".to_owned(),
        partner_id: "partner-1".to_owned(),
        client_id: "client-1".to_owned(),
        client_secret: "s3cret".to_owned(),
    });
    config.agency_acronym = Some("SPD".to_owned());
    config
}

pub fn now_millis() -> i64 {
    Timestamp::now().as_epoch_millis()
}

pub fn token_body(access_token: &str, expires_on_millis: i64) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_on": expires_on_millis,
        "not_before": now_millis(),
        "version": "2",
        "entity": { "type": "partner", "id": "entity-1", "partner_id": "partner-1" }
    })
}

pub fn device(id: &str, status: &str, fix_millis: i64) -> Value {
    json!({
        "partnerId": "partner-1",
        "partnerName": "Springfield PD",
        "axonDeviceId": id,
        "deviceModel": "AXON_BODY_4",
        "deviceUpdateTimestamp": fix_millis,
        "attributes": {
            "deviceSerial": format!("X{id}"),
            "location": {
                "accuracy": 4.5,
                "latitude": 39.78,
                "longitude": -89.65,
                "locationUpdateTimestamp": fix_millis
            },
            "status": status,
            "stream": { "isStreamable": true },
            "batteries": [{ "batteryPercentage": 72 }],
            "assignees": [{
                "assigneeType": "USER",
                "firstName": "Jane",
                "lastName": "Doe",
                "badgeNumber": "1234",
                "userId": "u-1",
                "primary": true
            }]
        }
    })
}

pub fn search_body(total_hits: u64, devices: Vec<Value>) -> Value {
    json!({
        "meta": {
            "correlationId": "corr-1",
            "serverTimestamp": now_millis(),
            "totalHits": total_hits,
            "count": devices.len()
        },
        "data": devices
    })
}
