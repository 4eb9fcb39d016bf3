//! HTTP client for the dispatch REST API.

use async_trait::async_trait;
use courier_common::ApiError;
use courier_config::schema::ApiConfig;
use reqwest::Method;

use super::types::{DriverProfile, LocationUpdate};

/// The dispatch REST boundary, as a trait so the session and channel can
/// be exercised against in-memory fakes.
#[async_trait]
pub trait DispatchApi: Send + Sync {
    /// `POST /drivers/profile/active` — mark the driver online.
    async fn activate(&self) -> Result<DriverProfile, ApiError>;

    /// `DELETE /drivers/profile/active` — mark the driver offline.
    async fn deactivate(&self) -> Result<DriverProfile, ApiError>;

    /// `GET /drivers/profile` — fetch the current profile (reconciliation).
    async fn fetch_profile(&self) -> Result<DriverProfile, ApiError>;

    /// `POST /tracking/location` — best-effort location persistence.
    async fn push_location(&self, update: &LocationUpdate) -> Result<(), ApiError>;
}

/// Production implementation over reqwest.
pub struct HttpDispatchApi {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl HttpDispatchApi {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            http: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(5))
                .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
    }

    async fn send_for_profile(
        &self,
        method: Method,
        path: &str,
    ) -> Result<DriverProfile, ApiError> {
        let response = self
            .request(method, path)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<DriverProfile>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DispatchApi for HttpDispatchApi {
    async fn activate(&self) -> Result<DriverProfile, ApiError> {
        self.send_for_profile(Method::POST, "/drivers/profile/active")
            .await
    }

    async fn deactivate(&self) -> Result<DriverProfile, ApiError> {
        self.send_for_profile(Method::DELETE, "/drivers/profile/active")
            .await
    }

    async fn fetch_profile(&self) -> Result<DriverProfile, ApiError> {
        self.send_for_profile(Method::GET, "/drivers/profile").await
    }

    async fn push_location(&self, update: &LocationUpdate) -> Result<(), ApiError> {
        let response = self
            .request(Method::POST, "/tracking/location")
            .json(update)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}
