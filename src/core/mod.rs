pub mod catalog;
pub mod engine;
pub mod features;
pub mod gate;
pub mod limits;
pub mod resolver;

#[cfg(test)]
pub(crate) mod fixtures;

pub use crate::domain::model::{Feature, MaxUsers, Package, PackageRef, Subscription, SubscriptionStatus};
pub use crate::domain::ports::{ConfigProvider, EntitlementSource, QueryState};
pub use crate::utils::error::Result;
