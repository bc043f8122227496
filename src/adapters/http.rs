use crate::domain::model::{ApiEnvelope, Package, SubscriptionStatus};
use crate::domain::ports::{ConfigProvider, EntitlementSource};
use crate::utils::error::{GateError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// REST client for the subscription and package endpoints.
///
/// Each call is a single GET; there is no retry.
pub struct HttpEntitlementSource {
    client: Client,
    base_url: String,
    subscription_path: String,
    packages_path: String,
    access_token: Option<String>,
}

impl HttpEntitlementSource {
    pub fn new<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds()))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url().trim_end_matches('/').to_string(),
            subscription_path: config.subscription_path().to_string(),
            packages_path: config.packages_path().to_string(),
            access_token: config.access_token().map(str::to_string),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url_for(path);
        tracing::debug!("Making API request to: {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(GateError::HttpStatusError {
                status: status.as_u16(),
                url,
            });
        }

        // 先取文字再解析，錯誤訊息才會指向 serde
        let body = response.text().await?;
        let envelope: ApiEnvelope<T> = serde_json::from_str(&body)?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl EntitlementSource for HttpEntitlementSource {
    async fn fetch_subscription_status(&self) -> Result<SubscriptionStatus> {
        self.get_data(&self.subscription_path).await
    }

    async fn fetch_packages(&self) -> Result<Vec<Package>> {
        self.get_data(&self.packages_path).await
    }
}
