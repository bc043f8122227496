//! Usage ceilings.
//!
//! Every countable entity currently shares the package's single `maxUsers`
//! ceiling. [`EntityKind::ceiling`] is the one place to change when packages
//! grow per-entity limits.

use crate::core::resolver::resolve_package;
use crate::domain::model::{MaxUsers, Package, Subscription};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Users,
    Activities,
    Promises,
    Donations,
    Audiences,
    Beneficiaries,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Users,
        EntityKind::Activities,
        EntityKind::Promises,
        EntityKind::Donations,
        EntityKind::Audiences,
        EntityKind::Beneficiaries,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Users => "users",
            EntityKind::Activities => "activities",
            EntityKind::Promises => "promises",
            EntityKind::Donations => "donations",
            EntityKind::Audiences => "audiences",
            EntityKind::Beneficiaries => "beneficiaries",
        }
    }

    /// Ceiling for this kind of record, `None` when the package carries none.
    pub fn ceiling(&self, package: &Package) -> Option<MaxUsers> {
        match self {
            EntityKind::Users
            | EntityKind::Activities
            | EntityKind::Promises
            | EntityKind::Donations
            | EntityKind::Audiences
            | EntityKind::Beneficiaries => package.max_users,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" | "users" => Ok(EntityKind::Users),
            "activity" | "activities" => Ok(EntityKind::Activities),
            "promise" | "promises" => Ok(EntityKind::Promises),
            "donation" | "donations" => Ok(EntityKind::Donations),
            "audience" | "audiences" => Ok(EntityKind::Audiences),
            "beneficiary" | "beneficiaries" => Ok(EntityKind::Beneficiaries),
            other => Err(format!(
                "unknown entity kind '{}', expected one of: {}",
                other,
                EntityKind::ALL.map(|kind| kind.as_str()).join(", ")
            )),
        }
    }
}

fn resolve_ceiling(
    kind: EntityKind,
    subscription: Option<&Subscription>,
    packages: &[Package],
) -> Option<MaxUsers> {
    resolve_package(subscription, packages).and_then(|package| kind.ceiling(package))
}

/// `None` when the package is unresolved, carries no ceiling, or is unlimited.
pub fn get_limit(
    kind: EntityKind,
    subscription: Option<&Subscription>,
    packages: &[Package],
) -> Option<u64> {
    resolve_ceiling(kind, subscription, packages).and_then(|max_users| max_users.ceiling())
}

/// Fails closed: an unresolved subscription, package or ceiling counts as reached.
pub fn has_reached_limit(
    kind: EntityKind,
    subscription: Option<&Subscription>,
    packages: &[Package],
    current_count: u64,
) -> bool {
    match resolve_ceiling(kind, subscription, packages) {
        None => true,
        Some(MaxUsers::Unlimited) => false,
        Some(MaxUsers::Limited(max)) => current_count >= max,
    }
}

pub fn get_remaining_count(
    kind: EntityKind,
    subscription: Option<&Subscription>,
    packages: &[Package],
    current_count: u64,
) -> Option<u64> {
    get_limit(kind, subscription, packages).map(|max| max.saturating_sub(current_count))
}

pub fn get_max_users_limit(subscription: Option<&Subscription>, packages: &[Package]) -> Option<u64> {
    get_limit(EntityKind::Users, subscription, packages)
}

pub fn has_reached_max_users(
    subscription: Option<&Subscription>,
    packages: &[Package],
    current_count: u64,
) -> bool {
    has_reached_limit(EntityKind::Users, subscription, packages, current_count)
}

pub fn get_remaining_users_count(
    subscription: Option<&Subscription>,
    packages: &[Package],
    current_count: u64,
) -> Option<u64> {
    get_remaining_count(EntityKind::Users, subscription, packages, current_count)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LimitStatus {
    Unlimited,
    Within { current: u64, max: u64, remaining: u64 },
    Reached { current: u64, max: u64 },
    /// No package or no ceiling to read; callers must treat this as reached.
    Unknown { current: u64 },
}

impl LimitStatus {
    pub fn is_reached(&self) -> bool {
        matches!(self, LimitStatus::Reached { .. } | LimitStatus::Unknown { .. })
    }
}

pub fn limit_status(
    kind: EntityKind,
    subscription: Option<&Subscription>,
    packages: &[Package],
    current_count: u64,
) -> LimitStatus {
    match resolve_ceiling(kind, subscription, packages) {
        None => LimitStatus::Unknown {
            current: current_count,
        },
        Some(MaxUsers::Unlimited) => LimitStatus::Unlimited,
        Some(MaxUsers::Limited(max)) if current_count >= max => LimitStatus::Reached {
            current: current_count,
            max,
        },
        Some(MaxUsers::Limited(max)) => LimitStatus::Within {
            current: current_count,
            max,
            remaining: max - current_count,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::{chat_package, package, subscription_for};

    #[test]
    fn test_finite_ceiling_is_reported() {
        let packages = vec![chat_package()];
        let subscription = subscription_for("pkg-chat");

        assert_eq!(get_max_users_limit(Some(&subscription), &packages), Some(5));
    }

    #[test]
    fn test_boundary_count_equal_to_ceiling_is_reached() {
        let packages = vec![chat_package()];
        let subscription = subscription_for("pkg-chat");

        assert!(!has_reached_max_users(Some(&subscription), &packages, 4));
        assert!(has_reached_max_users(Some(&subscription), &packages, 5));
        assert!(has_reached_max_users(Some(&subscription), &packages, 6));
        assert_eq!(get_remaining_users_count(Some(&subscription), &packages, 5), Some(0));
    }

    #[test]
    fn test_remaining_never_goes_negative() {
        let packages = vec![chat_package()];
        let subscription = subscription_for("pkg-chat");

        assert_eq!(get_remaining_users_count(Some(&subscription), &packages, 2), Some(3));
        assert_eq!(get_remaining_users_count(Some(&subscription), &packages, 40), Some(0));
    }

    #[test]
    fn test_unlimited_package_never_reaches_limit() {
        let packages = vec![package("unl", MaxUsers::Unlimited, vec![])];
        let subscription = subscription_for("unl");

        assert_eq!(get_max_users_limit(Some(&subscription), &packages), None);
        for count in [0, 1, 10_000, u64::MAX] {
            assert!(!has_reached_max_users(Some(&subscription), &packages, count));
        }
        assert_eq!(get_remaining_users_count(Some(&subscription), &packages, 3), None);
    }

    #[test]
    fn test_missing_entitlement_fails_closed() {
        let packages = vec![chat_package()];
        let unresolved = subscription_for("pkg-gone");

        assert!(has_reached_max_users(None, &packages, 0));
        assert!(has_reached_max_users(Some(&unresolved), &packages, 0));
        assert_eq!(get_max_users_limit(None, &packages), None);
        assert_eq!(get_remaining_users_count(Some(&unresolved), &packages, 0), None);
    }

    #[test]
    fn test_package_without_ceiling_fails_closed() {
        let mut legacy = package("legacy", MaxUsers::Limited(0), vec![]);
        legacy.max_users = None;
        let packages = vec![legacy];
        let subscription = subscription_for("legacy");

        for kind in EntityKind::ALL {
            assert!(has_reached_limit(kind, Some(&subscription), &packages, 0));
            assert_eq!(get_limit(kind, Some(&subscription), &packages), None);
            assert_eq!(get_remaining_count(kind, Some(&subscription), &packages, 0), None);
            assert_eq!(
                limit_status(kind, Some(&subscription), &packages, 3),
                LimitStatus::Unknown { current: 3 }
            );
        }
    }

    #[test]
    fn test_every_kind_shares_the_max_users_ceiling() {
        let packages = vec![chat_package()];
        let subscription = subscription_for("pkg-chat");

        for kind in EntityKind::ALL {
            assert_eq!(get_limit(kind, Some(&subscription), &packages), Some(5));
            assert!(has_reached_limit(kind, Some(&subscription), &packages, 5));
            assert_eq!(
                get_remaining_count(kind, Some(&subscription), &packages, 1),
                Some(4)
            );
        }
    }

    #[test]
    fn test_zero_ceiling_is_always_reached() {
        let packages = vec![package("frozen", MaxUsers::Limited(0), vec![])];
        let subscription = subscription_for("frozen");

        assert!(has_reached_limit(EntityKind::Donations, Some(&subscription), &packages, 0));
    }

    #[test]
    fn test_limit_status_variants() {
        let packages = vec![chat_package(), package("unl", MaxUsers::Unlimited, vec![])];
        let limited = subscription_for("pkg-chat");
        let unlimited = subscription_for("unl");

        assert_eq!(
            limit_status(EntityKind::Audiences, Some(&limited), &packages, 2),
            LimitStatus::Within {
                current: 2,
                max: 5,
                remaining: 3
            }
        );
        assert_eq!(
            limit_status(EntityKind::Audiences, Some(&limited), &packages, 5),
            LimitStatus::Reached { current: 5, max: 5 }
        );
        assert_eq!(
            limit_status(EntityKind::Audiences, Some(&unlimited), &packages, 5),
            LimitStatus::Unlimited
        );

        let unknown = limit_status(EntityKind::Audiences, None, &packages, 1);
        assert_eq!(unknown, LimitStatus::Unknown { current: 1 });
        assert!(unknown.is_reached());
    }

    #[test]
    fn test_entity_kind_parsing() {
        assert_eq!("Beneficiary".parse::<EntityKind>(), Ok(EntityKind::Beneficiaries));
        assert_eq!("users".parse::<EntityKind>(), Ok(EntityKind::Users));
        assert!("volunteers".parse::<EntityKind>().is_err());
        assert_eq!(EntityKind::Promises.to_string(), "promises");
    }
}
