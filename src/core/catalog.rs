use crate::domain::model::Package;
use crate::domain::ports::EntitlementSource;
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Session-wide package list, fetched at most once until invalidated.
///
/// A failed fetch is not cached; the next call tries again.
#[derive(Debug, Default)]
pub struct PackageCatalog {
    packages: RwLock<Option<Arc<Vec<Package>>>>,
}

impl PackageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated catalog, for callers that already hold the package list.
    pub fn with_packages(packages: Vec<Package>) -> Self {
        Self {
            packages: RwLock::new(Some(Arc::new(packages))),
        }
    }

    pub async fn get_or_load<S: EntitlementSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<Arc<Vec<Package>>> {
        if let Some(packages) = self.packages.read().await.as_ref() {
            return Ok(Arc::clone(packages));
        }

        let mut slot = self.packages.write().await;
        // 另一個呼叫者可能已經先載入
        if let Some(packages) = slot.as_ref() {
            return Ok(Arc::clone(packages));
        }

        tracing::debug!("Package catalog empty, fetching package list");
        let packages = Arc::new(source.fetch_packages().await?);
        tracing::info!("Cached {} packages", packages.len());
        *slot = Some(Arc::clone(&packages));
        Ok(packages)
    }

    pub async fn snapshot(&self) -> Option<Arc<Vec<Package>>> {
        self.packages.read().await.clone()
    }

    pub async fn invalidate(&self) {
        tracing::debug!("Invalidating package catalog");
        *self.packages.write().await = None;
    }
}
