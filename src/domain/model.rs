use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A single switchable capability inside a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub enable: bool,
}

/// Seat/record ceiling of a package.
///
/// On the wire this is either a number (or numeric string) or the sentinel
/// `"unlimited"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMaxUsers", into = "RawMaxUsers")]
pub enum MaxUsers {
    Limited(u64),
    Unlimited,
}

impl MaxUsers {
    pub const UNLIMITED_SENTINEL: &'static str = "unlimited";

    /// Finite ceiling, `None` when unlimited.
    pub fn ceiling(&self) -> Option<u64> {
        match self {
            MaxUsers::Limited(max) => Some(*max),
            MaxUsers::Unlimited => None,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, MaxUsers::Unlimited)
    }
}

impl fmt::Display for MaxUsers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxUsers::Limited(max) => write!(f, "{}", max),
            MaxUsers::Unlimited => write!(f, "{}", Self::UNLIMITED_SENTINEL),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawMaxUsers {
    Number(u64),
    Text(String),
}

impl TryFrom<RawMaxUsers> for MaxUsers {
    type Error = String;

    fn try_from(raw: RawMaxUsers) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawMaxUsers::Number(max) => Ok(MaxUsers::Limited(max)),
            RawMaxUsers::Text(text) => {
                let trimmed = text.trim();
                if trimmed.eq_ignore_ascii_case(MaxUsers::UNLIMITED_SENTINEL) {
                    return Ok(MaxUsers::Unlimited);
                }
                trimmed.parse::<u64>().map(MaxUsers::Limited).map_err(|_| {
                    format!(
                        "maxUsers must be a non-negative integer or \"{}\", got \"{}\"",
                        MaxUsers::UNLIMITED_SENTINEL,
                        text
                    )
                })
            }
        }
    }
}

impl From<MaxUsers> for RawMaxUsers {
    fn from(max_users: MaxUsers) -> Self {
        match max_users {
            MaxUsers::Limited(max) => RawMaxUsers::Number(max),
            MaxUsers::Unlimited => RawMaxUsers::Text(MaxUsers::UNLIMITED_SENTINEL.to_string()),
        }
    }
}

/// A purchasable tier. Read-only reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// `None` when the API sends no ceiling (missing or `null`). Limit checks
    /// treat that as unresolved.
    #[serde(default)]
    pub max_users: Option<MaxUsers>,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl Package {
    /// Exact, case-sensitive lookup. The first feature with a matching name wins.
    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|feature| feature.name == name)
    }
}

/// The subscription's `packageId` field, which the API sends either as a bare id
/// or as the already-expanded package document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PackageRef {
    Id(String),
    Expanded(Box<Package>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionStatusLabel {
    Active,
    Inactive,
    Expired,
    Cancelled,
    Pending,
    Other(String),
}

impl From<String> for SubscriptionStatusLabel {
    fn from(label: String) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "active" => SubscriptionStatusLabel::Active,
            "inactive" => SubscriptionStatusLabel::Inactive,
            "expired" => SubscriptionStatusLabel::Expired,
            "cancelled" | "canceled" => SubscriptionStatusLabel::Cancelled,
            "pending" => SubscriptionStatusLabel::Pending,
            _ => SubscriptionStatusLabel::Other(label),
        }
    }
}

impl From<SubscriptionStatusLabel> for String {
    fn from(label: SubscriptionStatusLabel) -> Self {
        label.to_string()
    }
}

impl fmt::Display for SubscriptionStatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionStatusLabel::Active => write!(f, "active"),
            SubscriptionStatusLabel::Inactive => write!(f, "inactive"),
            SubscriptionStatusLabel::Expired => write!(f, "expired"),
            SubscriptionStatusLabel::Cancelled => write!(f, "cancelled"),
            SubscriptionStatusLabel::Pending => write!(f, "pending"),
            SubscriptionStatusLabel::Other(label) => write!(f, "{}", label),
        }
    }
}

/// One organization's current plan assignment, as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub package_id: PackageRef,
    pub status: SubscriptionStatusLabel,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub end_date: Option<NaiveDate>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatusLabel::Active
    }

    /// Days until `end_date`; negative once the end date has passed.
    pub fn days_remaining(&self, today: NaiveDate) -> Option<i64> {
        self.end_date.map(|end| (end - today).num_days())
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.end_date.map(|end| end < today).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    #[serde(default)]
    pub has_active_subscription: bool,
    #[serde(default)]
    pub subscription: Option<Subscription>,
}

/// `{ "data": ... }` wrapper used by every API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: T,
}

// 接受 "2024-01-31" 或 "2024-01-31T00:00:00.000Z"
fn deserialize_optional_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Some(date));
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|timestamp| Some(timestamp.date_naive()))
        .map_err(|e| serde::de::Error::custom(format!("invalid date '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_max_users_accepts_number_numeric_string_and_sentinel() {
        let limited: MaxUsers = serde_json::from_value(json!(5)).unwrap();
        let textual: MaxUsers = serde_json::from_value(json!("12")).unwrap();
        let unlimited: MaxUsers = serde_json::from_value(json!("Unlimited")).unwrap();

        assert_eq!(limited, MaxUsers::Limited(5));
        assert_eq!(textual, MaxUsers::Limited(12));
        assert_eq!(unlimited, MaxUsers::Unlimited);
        assert_eq!(unlimited.ceiling(), None);
    }

    #[test]
    fn test_max_users_rejects_garbage() {
        assert!(serde_json::from_value::<MaxUsers>(json!("lots")).is_err());
        assert!(serde_json::from_value::<MaxUsers>(json!(-1)).is_err());
    }

    #[test]
    fn test_max_users_serializes_back_to_wire_form() {
        assert_eq!(serde_json::to_value(MaxUsers::Limited(3)).unwrap(), json!(3));
        assert_eq!(
            serde_json::to_value(MaxUsers::Unlimited).unwrap(),
            json!("unlimited")
        );
    }

    #[test]
    fn test_package_without_ceiling_still_decodes() {
        let packages: Vec<Package> = serde_json::from_value(json!([
            {"_id": "pkg-ok", "name": "Ok", "maxUsers": 5, "features": []},
            {"_id": "pkg-legacy", "maxUsers": null},
            {"_id": "pkg-bare", "name": "Bare", "features": [{"value": "x", "enable": true}]}
        ]))
        .unwrap();

        assert_eq!(packages.len(), 3);
        assert_eq!(packages[0].max_users, Some(MaxUsers::Limited(5)));
        assert_eq!(packages[1].max_users, None);
        assert_eq!(packages[1].name, "");
        assert_eq!(packages[2].max_users, None);
        assert_eq!(packages[2].features[0].name, "");
    }

    #[test]
    fn test_package_ref_distinguishes_id_from_expanded_package() {
        let by_id: PackageRef = serde_json::from_value(json!("pkg-basic")).unwrap();
        assert_eq!(by_id, PackageRef::Id("pkg-basic".to_string()));

        let expanded: PackageRef = serde_json::from_value(json!({
            "_id": "pkg-pro",
            "name": "Pro",
            "maxUsers": "unlimited",
            "features": [{"name": "chat", "value": "10", "enable": true}]
        }))
        .unwrap();

        match expanded {
            PackageRef::Expanded(package) => {
                assert_eq!(package.id, "pkg-pro");
                assert_eq!(package.description, "");
                assert_eq!(package.max_users, Some(MaxUsers::Unlimited));
            }
            other => panic!("expected expanded package, got {:?}", other),
        }
    }

    #[test]
    fn test_feature_lookup_is_case_sensitive_and_first_match() {
        let package = Package {
            id: "p".to_string(),
            name: "P".to_string(),
            description: String::new(),
            max_users: Some(MaxUsers::Limited(1)),
            features: vec![
                Feature {
                    name: "chat".to_string(),
                    value: "first".to_string(),
                    enable: true,
                },
                Feature {
                    name: "chat".to_string(),
                    value: "second".to_string(),
                    enable: false,
                },
            ],
        };

        assert_eq!(package.feature("chat").unwrap().value, "first");
        assert!(package.feature("Chat").is_none());
    }

    #[test]
    fn test_subscription_dates_and_status() {
        let status: ApiEnvelope<SubscriptionStatus> = serde_json::from_value(json!({
            "data": {
                "hasActiveSubscription": true,
                "subscription": {
                    "packageId": "pkg-basic",
                    "status": "ACTIVE",
                    "startDate": "2026-01-01T08:30:00.000Z",
                    "endDate": "2026-12-31"
                }
            }
        }))
        .unwrap();

        let subscription = status.data.subscription.unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 12, 1).unwrap();

        assert!(subscription.is_active());
        assert_eq!(subscription.start_date, NaiveDate::from_ymd_opt(2026, 1, 1));
        assert_eq!(subscription.days_remaining(today), Some(30));
        assert!(!subscription.is_expired(today));
        assert!(subscription.is_expired(NaiveDate::from_ymd_opt(2027, 1, 1).unwrap()));
    }

    #[test]
    fn test_unknown_status_label_is_preserved() {
        let label = SubscriptionStatusLabel::from("suspended".to_string());
        assert_eq!(label, SubscriptionStatusLabel::Other("suspended".to_string()));
        assert_eq!(label.to_string(), "suspended");
    }

    #[test]
    fn test_missing_subscription_and_dates_default_to_none() {
        let status: SubscriptionStatus =
            serde_json::from_value(json!({"hasActiveSubscription": false, "subscription": null}))
                .unwrap();
        assert!(status.subscription.is_none());

        let subscription: Subscription = serde_json::from_value(json!({
            "packageId": "pkg",
            "status": "pending",
            "endDate": null
        }))
        .unwrap();
        assert_eq!(subscription.end_date, None);
        assert_eq!(subscription.days_remaining(NaiveDate::MIN), None);
    }
}
