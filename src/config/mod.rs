pub mod toml_config;

use crate::core::engine::EvaluationRequest;
use crate::core::limits::EntityKind;
use crate::core::ConfigProvider;
use crate::utils::error::{GateError, Result};
use crate::utils::validation::{self, Validate};
use toml_config::{
    LogFormat, TomlConfig, DEFAULT_PACKAGES_PATH, DEFAULT_SUBSCRIPTION_PATH,
    DEFAULT_TIMEOUT_SECONDS,
};

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "package-gate")]
#[command(about = "Check package features and usage limits for the current subscription")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub api_base_url: Option<String>,

    #[arg(long)]
    pub subscription_path: Option<String>,

    #[arg(long)]
    pub packages_path: Option<String>,

    /// Bearer token for the API
    #[arg(long)]
    pub token: Option<String>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Feature names to check (repeatable or comma separated)
    #[arg(short, long = "feature", value_delimiter = ',')]
    pub features: Vec<String>,

    /// Current record count as kind=n, e.g. users=4 (repeatable)
    #[arg(long = "count", value_parser = parse_count)]
    pub counts: Vec<(EntityKind, u64)>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Show the resolved configuration without calling the API
    #[arg(long)]
    pub dry_run: bool,
}

pub fn parse_count(raw: &str) -> std::result::Result<(EntityKind, u64), String> {
    let (kind, count) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected kind=count, got '{}'", raw))?;
    let kind = kind.parse::<EntityKind>()?;
    let count = count
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("invalid count '{}': {}", count, e))?;
    Ok((kind, count))
}

/// Fully resolved settings for one run. Command-line values win over the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    pub api_base_url: String,
    pub subscription_path: String,
    pub packages_path: String,
    pub access_token: Option<String>,
    pub timeout_seconds: u64,
    pub log_format: LogFormat,
    pub verbose: bool,
    pub request: EvaluationRequest,
}

impl GateConfig {
    pub fn from_toml(file: &TomlConfig) -> Result<Self> {
        Ok(Self {
            api_base_url: file.api.base_url.clone(),
            subscription_path: file.subscription_path().to_string(),
            packages_path: file.packages_path().to_string(),
            access_token: file.access_token().map(str::to_string),
            timeout_seconds: file.timeout_seconds(),
            log_format: file.log_format(),
            verbose: file.verbose(),
            request: EvaluationRequest {
                features: file.features(),
                counts: file.counts()?,
            },
        })
    }

    #[cfg(feature = "cli")]
    pub fn from_cli(cli: &CliConfig) -> Result<Self> {
        let file = cli.config.as_ref().map(TomlConfig::from_file).transpose()?;
        let mut config = match &file {
            Some(file) => Self::from_toml(file)?,
            None => Self {
                api_base_url: validation::validate_required_field("api_base_url", &cli.api_base_url)?
                    .clone(),
                subscription_path: DEFAULT_SUBSCRIPTION_PATH.to_string(),
                packages_path: DEFAULT_PACKAGES_PATH.to_string(),
                access_token: None,
                timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
                log_format: LogFormat::Compact,
                verbose: false,
                request: EvaluationRequest::default(),
            },
        };

        // 命令列覆蓋設定
        if let Some(url) = &cli.api_base_url {
            config.api_base_url = url.clone();
        }
        if let Some(path) = &cli.subscription_path {
            config.subscription_path = path.clone();
        }
        if let Some(path) = &cli.packages_path {
            config.packages_path = path.clone();
        }
        if let Some(token) = &cli.token {
            config.access_token = Some(token.clone());
        }
        if let Some(timeout) = cli.timeout_seconds {
            config.timeout_seconds = timeout;
        }
        if cli.log_json {
            config.log_format = LogFormat::Json;
        }
        config.verbose |= cli.verbose;
        if !cli.features.is_empty() {
            config.request.features = cli.features.clone();
        }
        if !cli.counts.is_empty() {
            config.request.counts = cli.counts.clone();
        }

        Ok(config)
    }
}

impl ConfigProvider for GateConfig {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn subscription_path(&self) -> &str {
        &self.subscription_path
    }

    fn packages_path(&self) -> &str {
        &self.packages_path
    }

    fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

impl Validate for GateConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_base_url", &self.api_base_url)?;
        validation::validate_endpoint_path("subscription_path", &self.subscription_path)?;
        validation::validate_endpoint_path("packages_path", &self.packages_path)?;
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 300)?;
        if let Some(token) = &self.access_token {
            validation::validate_non_empty_string("token", token)?;
        }
        for (index, (kind, _)) in self.request.counts.iter().enumerate() {
            if self.request.counts[..index].iter().any(|(seen, _)| seen == kind) {
                return Err(GateError::InvalidConfigValueError {
                    field: "counts".to_string(),
                    value: kind.to_string(),
                    reason: "Each entity kind can only be counted once".to_string(),
                });
            }
        }
        for feature in &self.request.features {
            if feature.trim().is_empty() {
                return Err(GateError::InvalidConfigValueError {
                    field: "features".to_string(),
                    value: feature.clone(),
                    reason: "Feature names cannot be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}
