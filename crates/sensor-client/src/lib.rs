use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use types::SensorCreateRequest;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Connection options for the sensors REST API.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API root, e.g. `http://localhost:8080/api/v1`. Trailing slashes are ignored.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("cannot connect to backend: {0}")]
    Connect(#[source] reqwest::Error),
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("unexpected status {status}{}", format_message(.message))]
    UnexpectedStatus {
        status: u16,
        message: Option<String>,
    },
    #[error("failed to decode response body: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("http request failed: {0}")]
    Request(#[source] reqwest::Error),
}

fn format_message(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {message}"),
        None => String::new(),
    }
}

/// Sensor registered by a successful create call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedSensor {
    /// Identifier issued by the backend, if the response carried one.
    pub sensor_id: Option<String>,
}

impl CreatedSensor {
    /// First eight characters of the identifier, or `unknown`.
    pub fn short_id(&self) -> String {
        match &self.sensor_id {
            Some(id) => id.chars().take(8).collect(),
            None => "unknown".to_string(),
        }
    }
}

/// Operations the seeder needs from the sensors backend.
#[allow(async_fn_in_trait)]
pub trait SensorApi {
    fn base_url(&self) -> &str;

    async fn count_sensors(&self) -> Result<usize, ClientError>;

    async fn create_sensor(&self, request: &SensorCreateRequest) -> Result<CreatedSensor, ClientError>;
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CreateEnvelope {
    data: Option<CreatedBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedBody {
    sensor_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SensorApiClient {
    config: ClientConfig,
    http: Client,
}

impl SensorApiClient {
    pub fn new(mut config: ClientConfig) -> Result<Self, ClientError> {
        config.base_url = config.base_url.trim().trim_end_matches('/').to_string();

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(ClientError::Request)?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn sensors_url(&self) -> String {
        format!("{}/sensors", self.config.base_url)
    }

    fn classify(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout {
                timeout_ms: self.config.timeout_ms,
            }
        } else if err.is_connect() {
            ClientError::Connect(err)
        } else {
            ClientError::Request(err)
        }
    }
}

impl SensorApi for SensorApiClient {
    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn count_sensors(&self) -> Result<usize, ClientError> {
        let url = self.sensors_url();
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%url, status = status.as_u16(), "sensor listing rejected");
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                message: None,
            });
        }

        let envelope: ListEnvelope = response.json().await.map_err(ClientError::Decode)?;
        debug!(%url, count = envelope.data.len(), "sensor listing ok");
        Ok(envelope.data.len())
    }

    async fn create_sensor(&self, request: &SensorCreateRequest) -> Result<CreatedSensor, ClientError> {
        let url = self.sensors_url();
        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(request)
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        // the body is read as text first so a 201 with an odd body still counts as created
        let body = response.text().await.unwrap_or_default();

        if status != StatusCode::CREATED {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.message);
            warn!(
                district = %request.district_name,
                status = status.as_u16(),
                message = message.as_deref().unwrap_or(""),
                "sensor create rejected"
            );
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                message,
            });
        }

        let sensor_id = serde_json::from_str::<CreateEnvelope>(&body)
            .ok()
            .and_then(|envelope| envelope.data)
            .and_then(|data| data.sensor_id);
        debug!(
            district = %request.district_name,
            sensor_id = sensor_id.as_deref().unwrap_or("unknown"),
            "sensor created"
        );
        Ok(CreatedSensor { sensor_id })
    }
}
