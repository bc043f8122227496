use clap::Parser;
use package_gate::config::toml_config::LogFormat;
use package_gate::core::limits::LimitStatus;
use package_gate::utils::error::ErrorSeverity;
use package_gate::utils::{logger, validation::Validate};
use package_gate::{CliConfig, EntitlementReport, GateConfig, GateEngine, HttpEntitlementSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match GateConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    match config.log_format {
        LogFormat::Compact => logger::init_cli_logger(config.verbose),
        LogFormat::Json => logger::init_json_logger(config.verbose),
    }

    tracing::info!("Starting package-gate");
    tracing::debug!(
        "Resolved config: api={}, features={:?}, counts={:?}",
        config.api_base_url,
        config.request.features,
        config.request.counts
    );

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if cli.dry_run {
        display_config_summary(&config);
        return Ok(());
    }

    let source = HttpEntitlementSource::new(&config)?;
    let engine = GateEngine::new(source);

    match engine.evaluate(&config.request).await {
        Ok(report) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                display_report(&report);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Evaluation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2, // 可重試
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &GateConfig) {
    println!("📋 Configuration Summary:");
    println!("  API: {}", config.api_base_url);
    println!("  Subscription endpoint: {}", config.subscription_path);
    println!("  Packages endpoint: {}", config.packages_path);
    println!(
        "  Token: {}",
        if config.access_token.is_some() { "set" } else { "none" }
    );
    println!("  Timeout: {}s", config.timeout_seconds);
    if !config.request.features.is_empty() {
        println!("  Features: {}", config.request.features.join(", "));
    }
    for (kind, count) in &config.request.counts {
        println!("  Count {}: {}", kind, count);
    }
    println!("  🔍 DRY RUN - no requests sent");
}

fn display_report(report: &EntitlementReport) {
    println!("📋 Subscription");
    match (&report.subscription, &report.package) {
        (Some(subscription), package) => {
            println!("  Status: {}", subscription.status);
            if let Some(package) = package {
                let max_users = package
                    .max_users
                    .map(|max| max.to_string())
                    .unwrap_or_else(|| "⚠️ not set".to_string());
                println!(
                    "  Package: {} ({}), max users: {}",
                    package.name, package.id, max_users
                );
            } else {
                println!("  Package: ⚠️ not found in catalog");
            }
            if let Some(end) = subscription.end_date {
                match subscription.days_remaining {
                    Some(days) if days >= 0 => println!("  Ends: {} ({} days left)", end, days),
                    _ => println!("  Ended: {}", end),
                }
            }
        }
        (None, _) => println!("  ⚠️ No subscription ({:?})", report.query),
    }

    if !report.accessible_features.is_empty() {
        println!();
        println!("✅ Enabled features:");
        for feature in &report.accessible_features {
            println!("  {} = {}", feature.name, feature.value);
        }
    }

    if !report.feature_checks.is_empty() {
        println!();
        println!("🔑 Feature checks:");
        for check in &report.feature_checks {
            let mark = if check.allowed { "✅" } else { "❌" };
            match &check.value {
                Some(value) => println!("  {} {} ({})", mark, check.name, value),
                None => println!("  {} {}", mark, check.name),
            }
        }
    }

    if !report.limits.is_empty() {
        println!();
        println!("📊 Limits:");
        for limit in &report.limits {
            let line = match limit.status {
                LimitStatus::Unlimited => "unlimited".to_string(),
                LimitStatus::Within {
                    current,
                    max,
                    remaining,
                } => format!("{}/{} ({} remaining)", current, max, remaining),
                LimitStatus::Reached { current, max } => {
                    format!("{}/{} ⛔ limit reached", current, max)
                }
                LimitStatus::Unknown { current } => {
                    format!("{}/? ⛔ no entitlement data", current)
                }
            };
            println!("  {}: {}", limit.kind, line);
        }
    }
}
