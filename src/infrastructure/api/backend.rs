//! Authenticated JSON client for the main backend
//!
//! Every request carries `Authorization: Bearer <token>` when the token
//! store has one, and uses the shorter general request timeout.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::session::{StaticTokenStore, TokenStore};
use crate::config::AppConfig;
use crate::domain::models::DetectionRecord;
use crate::shared::errors::{PipelineError, Result};
use crate::shared::logging;

pub struct BackendClient {
    http: Client,
    config: AppConfig,
    timeout: Duration,
    token_store: Arc<dyn TokenStore>,
}

impl BackendClient {
    pub fn new(config: &AppConfig, token_store: Arc<dyn TokenStore>) -> Result<Self> {
        Ok(Self {
            http: Client::builder().build()?,
            config: config.clone(),
            timeout: config.request_timeout,
            token_store,
        })
    }

    /// Client without credentials
    pub fn anonymous(config: &AppConfig) -> Result<Self> {
        Self::new(config, Arc::new(StaticTokenStore::default()))
    }

    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.timeout(self.timeout);
        match self.token_store.token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %body, "Backend request failed");
        Err(PipelineError::Http {
            status: status.as_u16(),
            body,
        })
    }

    // Generic GET request
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let request = self.authorize(self.http.get(self.config.endpoint(endpoint))).await;
        let response = Self::check(request.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    // Generic POST request
    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let request = self
            .authorize(self.http.post(self.config.endpoint(endpoint)).json(body))
            .await;
        let response = Self::check(request.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    // Generic DELETE request
    pub async fn delete(&self, endpoint: &str) -> Result<()> {
        let request = self
            .authorize(self.http.delete(self.config.endpoint(endpoint)))
            .await;
        Self::check(request.send().await?).await?;
        Ok(())
    }

    /// Store an accepted detection; returns the backend's JSON reply
    pub async fn create_detection(&self, record: &DetectionRecord) -> Result<Value> {
        let created: Value = self.post(&self.config.detections_path, record).await?;
        logging::log_detection_saved(&record.clasificacion, record.confianza_ia);
        Ok(created)
    }
}
