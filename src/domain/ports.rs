use crate::domain::model::{Package, SubscriptionStatus};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Outcome of an asynchronous read owned by the caller's query layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState<T> {
    Loading,
    Failed(String),
    Ready(T),
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            QueryState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Ready(data) => Some(data),
            _ => None,
        }
    }
}

impl<T, E: std::fmt::Display> From<std::result::Result<T, E>> for QueryState<T> {
    fn from(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(data) => QueryState::Ready(data),
            Err(e) => QueryState::Failed(e.to_string()),
        }
    }
}

#[async_trait]
pub trait EntitlementSource: Send + Sync {
    async fn fetch_subscription_status(&self) -> Result<SubscriptionStatus>;
    async fn fetch_packages(&self) -> Result<Vec<Package>>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn subscription_path(&self) -> &str;
    fn packages_path(&self) -> &str;
    fn access_token(&self) -> Option<&str>;
    fn timeout_seconds(&self) -> u64;
}
