pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::http::HttpEntitlementSource;
pub use config::GateConfig;
pub use crate::core::{
    catalog::PackageCatalog,
    engine::{EntitlementReport, EvaluationRequest, GateEngine},
    gate::SubscriptionGate,
    limits::EntityKind,
    resolver::resolve_package,
};
pub use utils::error::{GateError, Result};
