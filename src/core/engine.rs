use crate::core::catalog::PackageCatalog;
use crate::core::gate::SubscriptionGate;
use crate::core::limits::{EntityKind, LimitStatus};
use crate::domain::model::{Feature, MaxUsers, SubscriptionStatus, SubscriptionStatusLabel};
use crate::domain::ports::{EntitlementSource, QueryState};
use crate::utils::error::Result;
use chrono::{NaiveDate, Utc};
use serde::Serialize;

/// What a caller wants answered in one evaluation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationRequest {
    pub features: Vec<String>,
    pub counts: Vec<(EntityKind, u64)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QueryOutcome {
    Loading,
    Failed { error: String },
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageSummary {
    pub id: String,
    pub name: String,
    pub max_users: Option<MaxUsers>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionSummary {
    pub status: SubscriptionStatusLabel,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub days_remaining: Option<i64>,
    pub expired: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureCheck {
    pub name: String,
    pub allowed: bool,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitReport {
    pub kind: EntityKind,
    pub status: LimitStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitlementReport {
    pub query: QueryOutcome,
    pub has_active_subscription: bool,
    pub subscription: Option<SubscriptionSummary>,
    pub package: Option<PackageSummary>,
    pub accessible_features: Vec<Feature>,
    pub feature_checks: Vec<FeatureCheck>,
    pub limits: Vec<LimitReport>,
}

impl EntitlementReport {
    pub fn from_gate(gate: &SubscriptionGate<'_>, request: &EvaluationRequest, today: NaiveDate) -> Self {
        let query = if gate.is_loading() {
            QueryOutcome::Loading
        } else if let Some(error) = gate.error() {
            QueryOutcome::Failed {
                error: error.to_string(),
            }
        } else {
            QueryOutcome::Ready
        };

        let subscription = gate.subscription().map(|subscription| SubscriptionSummary {
            status: subscription.status.clone(),
            start_date: subscription.start_date,
            end_date: subscription.end_date,
            days_remaining: subscription.days_remaining(today),
            expired: subscription.is_expired(today),
        });

        let package = gate.get_current_package().map(|package| PackageSummary {
            id: package.id.clone(),
            name: package.name.clone(),
            max_users: package.max_users,
        });

        // 每個請求的功能都要出現在報告中，未結算時為拒絕
        let mut feature_checks: Vec<FeatureCheck> = Vec::with_capacity(request.features.len());
        for name in &request.features {
            if feature_checks.iter().any(|check| &check.name == name) {
                continue;
            }
            feature_checks.push(FeatureCheck {
                name: name.clone(),
                allowed: gate.has_access(name),
                value: gate.get_feature(name).map(str::to_string),
            });
        }

        let limits = request
            .counts
            .iter()
            .map(|(kind, count)| LimitReport {
                kind: *kind,
                status: gate.limit_status(*kind, *count),
            })
            .collect();

        Self {
            query,
            has_active_subscription: gate.has_active_subscription(),
            subscription,
            package,
            accessible_features: gate.get_accessible_features().into_iter().cloned().collect(),
            feature_checks,
            limits,
        }
    }
}

pub struct GateEngine<S: EntitlementSource> {
    source: S,
    catalog: PackageCatalog,
}

impl<S: EntitlementSource> GateEngine<S> {
    pub fn new(source: S) -> Self {
        Self::with_catalog(source, PackageCatalog::new())
    }

    pub fn with_catalog(source: S, catalog: PackageCatalog) -> Self {
        Self { source, catalog }
    }

    pub fn catalog(&self) -> &PackageCatalog {
        &self.catalog
    }

    /// Single attempt, no retry. Errors become `QueryState::Failed`.
    pub async fn query_subscription(&self) -> QueryState<SubscriptionStatus> {
        let result = self.source.fetch_subscription_status().await;
        if let Err(e) = &result {
            tracing::warn!("Subscription status query failed: {}", e);
        }
        QueryState::from(result)
    }

    pub async fn evaluate(&self, request: &EvaluationRequest) -> Result<EntitlementReport> {
        self.evaluate_on(request, Utc::now().date_naive()).await
    }

    /// Package list failures are returned as errors; a failed subscription query
    /// is reported inside the report with fail-closed answers.
    pub async fn evaluate_on(
        &self,
        request: &EvaluationRequest,
        today: NaiveDate,
    ) -> Result<EntitlementReport> {
        tracing::info!("Loading package catalog...");
        let packages = self.catalog.get_or_load(&self.source).await?;

        tracing::info!("Checking subscription status...");
        let query = self.query_subscription().await;

        let gate = SubscriptionGate::new(&query, &packages);
        match gate.get_current_package() {
            Some(package) => tracing::info!("Resolved package '{}' ({})", package.name, package.id),
            None if gate.subscription().is_some() => {
                tracing::warn!("Subscription references a package that is not in the catalog")
            }
            None => tracing::debug!("No subscription to resolve"),
        }

        let report = EntitlementReport::from_gate(&gate, request, today);
        tracing::debug!(
            "Evaluated {} features and {} limits",
            report.feature_checks.len(),
            report.limits.len()
        );
        Ok(report)
    }
}
