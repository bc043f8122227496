//! Builders shared by the core unit tests.

use crate::domain::model::{
    Feature, MaxUsers, Package, PackageRef, Subscription, SubscriptionStatus,
    SubscriptionStatusLabel,
};

pub fn feature(name: &str, value: &str, enable: bool) -> Feature {
    Feature {
        name: name.to_string(),
        value: value.to_string(),
        enable,
    }
}

pub fn package(id: &str, max_users: MaxUsers, features: Vec<Feature>) -> Package {
    Package {
        id: id.to_string(),
        name: format!("Package {}", id),
        description: String::new(),
        max_users: Some(max_users),
        features,
    }
}

pub fn subscription_for(package_id: &str) -> Subscription {
    Subscription {
        package_id: PackageRef::Id(package_id.to_string()),
        status: SubscriptionStatusLabel::Active,
        start_date: None,
        end_date: None,
    }
}

pub fn subscription_expanded(package: Package) -> Subscription {
    Subscription {
        package_id: PackageRef::Expanded(Box::new(package)),
        status: SubscriptionStatusLabel::Active,
        start_date: None,
        end_date: None,
    }
}

pub fn status_with(subscription: Option<Subscription>) -> SubscriptionStatus {
    SubscriptionStatus {
        has_active_subscription: subscription.is_some(),
        subscription,
    }
}

/// maxUsers 5; `chat` on ("10"), `reports` off ("3"), `export` on ("csv").
pub fn chat_package() -> Package {
    package(
        "pkg-chat",
        MaxUsers::Limited(5),
        vec![
            feature("chat", "10", true),
            feature("reports", "3", false),
            feature("export", "csv", true),
        ],
    )
}
