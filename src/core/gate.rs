//! Entitlement checks against a live subscription query.
//!
//! A [`SubscriptionGate`] is cheap to build: it borrows whatever snapshot the
//! caller currently holds and recomputes every answer from it. While the query is
//! loading, has failed, or carries no subscription, every check returns the
//! conservative answer without consulting the evaluator.

use crate::core::features::{self, FeatureChecks};
use crate::core::limits::{self, EntityKind, LimitStatus};
use crate::core::resolver::resolve_package;
use crate::domain::model::{Feature, Package, Subscription, SubscriptionStatus};
use crate::domain::ports::QueryState;

#[derive(Debug, Clone, Copy)]
pub struct SubscriptionGate<'a> {
    query: &'a QueryState<SubscriptionStatus>,
    packages: &'a [Package],
}

impl<'a> SubscriptionGate<'a> {
    pub fn new(query: &'a QueryState<SubscriptionStatus>, packages: &'a [Package]) -> Self {
        Self { query, packages }
    }

    pub fn is_loading(&self) -> bool {
        self.query.is_loading()
    }

    pub fn error(&self) -> Option<&'a str> {
        self.query.error()
    }

    pub fn has_active_subscription(&self) -> bool {
        self.query
            .data()
            .map(|status| status.has_active_subscription)
            .unwrap_or(false)
    }

    /// The subscription, only once the query has settled successfully.
    pub fn subscription(&self) -> Option<&'a Subscription> {
        self.query.data()?.subscription.as_ref()
    }

    pub fn has_access(&self, feature_name: &str) -> bool {
        match self.subscription() {
            Some(subscription) => {
                features::has_feature_access(Some(subscription), self.packages, feature_name)
            }
            None => false,
        }
    }

    pub fn get_feature(&self, feature_name: &str) -> Option<&'a str> {
        let subscription = self.subscription()?;
        features::get_feature_value(Some(subscription), self.packages, feature_name)
    }

    pub fn check_features<S: AsRef<str>>(&self, feature_names: &[S]) -> FeatureChecks {
        match self.subscription() {
            Some(subscription) => {
                features::check_multiple_features(Some(subscription), self.packages, feature_names)
            }
            None => FeatureChecks::default(),
        }
    }

    pub fn has_any_access<S: AsRef<str>>(&self, feature_names: &[S]) -> bool {
        match self.subscription() {
            Some(subscription) => {
                features::has_any_feature_access(Some(subscription), self.packages, feature_names)
            }
            None => false,
        }
    }

    pub fn has_all_access<S: AsRef<str>>(&self, feature_names: &[S]) -> bool {
        match self.subscription() {
            Some(subscription) => {
                features::has_all_features_access(Some(subscription), self.packages, feature_names)
            }
            None => false,
        }
    }

    pub fn has_reached_user_limit(&self, current_count: u64) -> bool {
        self.has_reached_limit(EntityKind::Users, current_count)
    }

    pub fn get_user_limit(&self) -> Option<u64> {
        self.get_limit(EntityKind::Users)
    }

    pub fn get_remaining_users_count(&self, current_count: u64) -> Option<u64> {
        self.get_remaining_count(EntityKind::Users, current_count)
    }

    pub fn has_reached_limit(&self, kind: EntityKind, current_count: u64) -> bool {
        match self.subscription() {
            Some(subscription) => {
                limits::has_reached_limit(kind, Some(subscription), self.packages, current_count)
            }
            None => true,
        }
    }

    pub fn get_limit(&self, kind: EntityKind) -> Option<u64> {
        let subscription = self.subscription()?;
        limits::get_limit(kind, Some(subscription), self.packages)
    }

    pub fn get_remaining_count(&self, kind: EntityKind, current_count: u64) -> Option<u64> {
        let subscription = self.subscription()?;
        limits::get_remaining_count(kind, Some(subscription), self.packages, current_count)
    }

    pub fn limit_status(&self, kind: EntityKind, current_count: u64) -> LimitStatus {
        limits::limit_status(kind, self.subscription(), self.packages, current_count)
    }

    /// Enabled features of the current package, in package order.
    pub fn get_accessible_features(&self) -> Vec<&'a Feature> {
        self.get_current_package()
            .map(features::accessible_features)
            .unwrap_or_default()
    }

    pub fn get_current_package(&self) -> Option<&'a Package> {
        let subscription = self.subscription()?;
        resolve_package(Some(subscription), self.packages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::{chat_package, status_with, subscription_for};

    fn ready_gate_fixture() -> (QueryState<SubscriptionStatus>, Vec<Package>) {
        let query = QueryState::Ready(status_with(Some(subscription_for("pkg-chat"))));
        (query, vec![chat_package()])
    }

    fn assert_fail_closed(gate: &SubscriptionGate<'_>) {
        assert!(!gate.has_access("chat"));
        assert_eq!(gate.get_feature("chat"), None);
        assert!(gate.check_features(&["chat", "export"]).is_empty());
        assert!(!gate.has_any_access(&["chat"]));
        assert!(!gate.has_all_access(&["chat"]));
        assert!(gate.has_reached_user_limit(0));
        assert_eq!(gate.get_user_limit(), None);
        assert_eq!(gate.get_remaining_users_count(0), None);
        assert!(gate.get_accessible_features().is_empty());
        assert!(gate.get_current_package().is_none());
        for kind in EntityKind::ALL {
            assert!(gate.has_reached_limit(kind, 0));
            assert!(gate.limit_status(kind, 0).is_reached());
        }
    }

    #[test]
    fn test_ready_subscription_delegates_to_evaluator() {
        let (query, packages) = ready_gate_fixture();
        let gate = SubscriptionGate::new(&query, &packages);

        assert!(gate.has_active_subscription());
        assert!(gate.has_access("chat"));
        assert!(!gate.has_access("video"));
        assert_eq!(gate.get_feature("chat"), Some("10"));
        assert!(gate.has_reached_user_limit(5));
        assert!(!gate.has_reached_user_limit(4));
        assert_eq!(gate.get_user_limit(), Some(5));
        assert_eq!(gate.get_remaining_users_count(5), Some(0));
        assert_eq!(gate.get_current_package().map(|p| p.id.as_str()), Some("pkg-chat"));
    }

    #[test]
    fn test_all_access_on_empty_list_requires_settled_subscription() {
        let (query, packages) = ready_gate_fixture();
        let gate = SubscriptionGate::new(&query, &packages);
        let none: [&str; 0] = [];

        assert!(gate.has_all_access(&none));
        assert!(!gate.has_any_access(&none));

        let loading = QueryState::Loading;
        assert!(!SubscriptionGate::new(&loading, &packages).has_all_access(&none));
    }

    #[test]
    fn test_accessible_features_preserve_package_order() {
        let (query, packages) = ready_gate_fixture();
        let gate = SubscriptionGate::new(&query, &packages);

        let names: Vec<&str> = gate
            .get_accessible_features()
            .iter()
            .map(|feature| feature.name.as_str())
            .collect();
        assert_eq!(names, vec!["chat", "export"]);
    }

    #[test]
    fn test_loading_query_fails_closed() {
        let query = QueryState::Loading;
        let packages = vec![chat_package()];
        let gate = SubscriptionGate::new(&query, &packages);

        assert!(gate.is_loading());
        assert!(!gate.has_active_subscription());
        assert_fail_closed(&gate);
    }

    #[test]
    fn test_failed_query_fails_closed() {
        let query = QueryState::Failed("network down".to_string());
        let packages = vec![chat_package()];
        let gate = SubscriptionGate::new(&query, &packages);

        assert_eq!(gate.error(), Some("network down"));
        assert_fail_closed(&gate);
    }

    #[test]
    fn test_absent_subscription_fails_closed() {
        let query = QueryState::Ready(status_with(None));
        let packages = vec![chat_package()];
        let gate = SubscriptionGate::new(&query, &packages);

        assert!(!gate.is_loading());
        assert_eq!(gate.error(), None);
        assert_fail_closed(&gate);
    }

    #[test]
    fn test_unresolved_package_fails_closed_for_limits() {
        let query = QueryState::Ready(status_with(Some(subscription_for("pkg-other"))));
        let packages = vec![chat_package()];
        let gate = SubscriptionGate::new(&query, &packages);

        assert!(gate.has_reached_user_limit(0));
        assert_eq!(gate.get_user_limit(), None);
        assert!(!gate.has_access("chat"));
    }
}
