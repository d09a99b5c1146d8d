//! Client for the remote classification endpoint
//!
//! Sends the data-URI image as the multipart field `imagen` and returns the
//! body for normalization. Error responses are reshaped into the same raw
//! form (`success: false` + `no_detection` or `error`); requests that get
//! no usable response come back as [`TransportFailure`]. Nothing is retried
//! here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::Form;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::Instrument;

use super::network;
use crate::config::AppConfig;
use crate::domain::models::detection::to_owned_list;
use crate::domain::models::{
    CONNECTION_SUGGESTIONS, DetectionResult, EncodedImage, NO_DETECTION_MESSAGE, RawResponse,
    SERVER_ERROR_MESSAGE,
};
use crate::domain::services::normalizer::{error_value, suggestions_or_default};
use crate::shared::errors::{PipelineError, Result};
use crate::shared::logging;

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "imagen";

/// No usable response was received
#[derive(Debug, Clone, PartialEq)]
pub struct TransportFailure {
    pub message: String,
    pub suggestions: Vec<String>,
}

impl TransportFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestions: to_owned_list(CONNECTION_SUGGESTIONS),
        }
    }

    pub fn into_result(self) -> DetectionResult {
        DetectionResult::Failure {
            message: self.message,
            suggestions: self.suggestions,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetectReply {
    /// A body to normalize (success or reshaped error response)
    Response(RawResponse),
    TransportFailure(TransportFailure),
}

/// Anything that can classify an encoded image
#[async_trait]
pub trait Detector: Send + Sync {
    async fn detect(&self, image: &str) -> DetectReply;
}

/// Health probe of the inference service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub roboflow_available: bool,
}

pub struct DetectionClient {
    http: Client,
    detect_url: String,
    health_url: String,
    detect_timeout: Duration,
    request_timeout: Duration,
}

impl DetectionClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            detect_url: config.detect_url(),
            health_url: config.health_url(),
            detect_timeout: config.detect_timeout,
            request_timeout: config.request_timeout,
        })
    }

    pub fn detect_url(&self) -> &str {
        &self.detect_url
    }

    pub fn detect_timeout(&self) -> Duration {
        self.detect_timeout
    }

    /// Probe the inference service
    pub async fn health(&self) -> Result<HealthStatus> {
        let response = self
            .http
            .get(&self.health_url)
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<HealthStatus>().await?)
    }

    async fn send(&self, image: &EncodedImage, attempt_id: &str) -> DetectReply {
        let form = Form::new().text(IMAGE_FIELD, image.as_str().to_string());

        let response = match self
            .http
            .post(&self.detect_url)
            .multipart(form)
            .timeout(self.detect_timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                logging::log_transport_failure(attempt_id, &e.to_string());
                return DetectReply::TransportFailure(TransportFailure::new(
                    network::describe_request_error(&e),
                ));
            }
        };

        let status = response.status();
        logging::log_detection_response(attempt_id, status.as_u16());

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                logging::log_transport_failure(attempt_id, &e.to_string());
                return DetectReply::TransportFailure(TransportFailure::new(
                    network::describe_request_error(&e),
                ));
            }
        };
        let body = serde_json::from_slice::<Value>(&bytes).ok();

        if status.is_success() {
            return match body {
                Some(body) => DetectReply::Response(RawResponse::new(body)),
                None => {
                    logging::log_transport_failure(attempt_id, "success status with non-JSON body");
                    DetectReply::TransportFailure(TransportFailure::new(
                        network::GARBLED_RESPONSE_MESSAGE,
                    ))
                }
            };
        }

        DetectReply::Response(reshape_error_body(status.as_u16(), body))
    }
}

#[async_trait]
impl Detector for DetectionClient {
    async fn detect(&self, image: &str) -> DetectReply {
        let image = EncodedImage::ensure_prefixed(image);
        let attempt_id = uuid::Uuid::new_v4().to_string();
        let span = crate::attempt_span!(attempt_id.as_str());

        logging::log_detection_start(&attempt_id, &self.detect_url, image.len());
        self.send(&image, &attempt_id).instrument(span).await
    }
}

/// Turn an error response into the raw `success: false` shape
pub fn reshape_error_body(status: u16, body: Option<Value>) -> RawResponse {
    let Some(Value::Object(body)) = body else {
        return RawResponse::new(json!({
            "success": false,
            "error": network::status_message(status),
        }));
    };

    if matches!(body.get("no_detection"), Some(Value::Bool(true))) {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(NO_DETECTION_MESSAGE);
        return RawResponse::new(json!({
            "success": false,
            "no_detection": true,
            "message": message,
            "suggestions": suggestions_or_default(body.get("suggestions")),
        }));
    }

    let error = error_value(body.get("error"))
        .cloned()
        .unwrap_or_else(|| Value::String(SERVER_ERROR_MESSAGE.to_string()));
    RawResponse::new(json!({
        "success": false,
        "error": error,
        "message": body.get("message").cloned().unwrap_or(Value::Null),
    }))
}
