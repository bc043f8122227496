use crate::core::resolver::resolve_package;
use crate::domain::model::{Feature, Package, Subscription};
use serde::{Serialize, Serializer};

/// Whether `feature_name` is switched on for the subscription's package.
///
/// `false` when there is no subscription, the package cannot be resolved, or the
/// package has no such feature.
pub fn has_feature_access(
    subscription: Option<&Subscription>,
    packages: &[Package],
    feature_name: &str,
) -> bool {
    resolve_package(subscription, packages)
        .and_then(|package| package.feature(feature_name))
        .map(|feature| feature.enable)
        .unwrap_or(false)
}

/// Configured value of an enabled feature. Disabled features report no value.
pub fn get_feature_value<'a>(
    subscription: Option<&'a Subscription>,
    packages: &'a [Package],
    feature_name: &str,
) -> Option<&'a str> {
    resolve_package(subscription, packages)
        .and_then(|package| package.feature(feature_name))
        .filter(|feature| feature.enable)
        .map(|feature| feature.value.as_str())
}

pub fn check_multiple_features<S: AsRef<str>>(
    subscription: Option<&Subscription>,
    packages: &[Package],
    feature_names: &[S],
) -> FeatureChecks {
    let mut checks = FeatureChecks::default();
    for name in feature_names {
        let name = name.as_ref();
        checks.insert(name, has_feature_access(subscription, packages, name));
    }
    checks
}

/// `false` for an empty list.
pub fn has_any_feature_access<S: AsRef<str>>(
    subscription: Option<&Subscription>,
    packages: &[Package],
    feature_names: &[S],
) -> bool {
    feature_names
        .iter()
        .any(|name| has_feature_access(subscription, packages, name.as_ref()))
}

/// `true` for an empty list.
pub fn has_all_features_access<S: AsRef<str>>(
    subscription: Option<&Subscription>,
    packages: &[Package],
    feature_names: &[S],
) -> bool {
    feature_names
        .iter()
        .all(|name| has_feature_access(subscription, packages, name.as_ref()))
}

pub fn accessible_features(package: &Package) -> Vec<&Feature> {
    package.features.iter().filter(|feature| feature.enable).collect()
}

/// Feature name to access flag, in the order the names were asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureChecks {
    entries: Vec<(String, bool)>,
}

impl FeatureChecks {
    // 重複的名稱保留第一次出現的位置
    fn insert(&mut self, name: &str, allowed: bool) {
        match self.entries.iter_mut().find(|(existing, _)| existing == name) {
            Some(entry) => entry.1 = allowed,
            None => self.entries.push((name.to_string(), allowed)),
        }
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, allowed)| *allowed)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(name, allowed)| (name.as_str(), *allowed))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FeatureChecks {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(name, allowed)| (name, allowed)))
    }
}
