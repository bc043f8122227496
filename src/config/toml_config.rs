use crate::core::limits::EntityKind;
use crate::utils::error::{GateError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_SUBSCRIPTION_PATH: &str = "/subscriptions/check";
pub const DEFAULT_PACKAGES_PATH: &str = "/packages";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub api: ApiConfig,
    pub logging: Option<LoggingConfig>,
    pub evaluation: Option<EvaluationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub subscription_path: Option<String>,
    pub packages_path: Option<String>,
    pub access_token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: Option<LogFormat>,
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub features: Option<Vec<String>>,
    /// entity kind -> current record count
    pub counts: Option<BTreeMap<String, u64>>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GateError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| GateError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${NGO_API_TOKEN})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| GateError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn subscription_path(&self) -> &str {
        self.api
            .subscription_path
            .as_deref()
            .unwrap_or(DEFAULT_SUBSCRIPTION_PATH)
    }

    pub fn packages_path(&self) -> &str {
        self.api.packages_path.as_deref().unwrap_or(DEFAULT_PACKAGES_PATH)
    }

    /// 未替換的 `${VAR}` 視為沒有 token
    pub fn access_token(&self) -> Option<&str> {
        self.api
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty() && !token.starts_with("${"))
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.api.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn log_format(&self) -> LogFormat {
        self.logging
            .as_ref()
            .and_then(|logging| logging.format)
            .unwrap_or_default()
    }

    pub fn verbose(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|logging| logging.verbose)
            .unwrap_or(false)
    }

    pub fn features(&self) -> Vec<String> {
        self.evaluation
            .as_ref()
            .and_then(|evaluation| evaluation.features.clone())
            .unwrap_or_default()
    }

    pub fn counts(&self) -> Result<Vec<(EntityKind, u64)>> {
        let Some(counts) = self.evaluation.as_ref().and_then(|e| e.counts.as_ref()) else {
            return Ok(Vec::new());
        };

        let mut parsed: Vec<(EntityKind, u64)> = Vec::with_capacity(counts.len());
        for (raw, count) in counts {
            let kind = raw
                .parse::<EntityKind>()
                .map_err(|reason| GateError::InvalidConfigValueError {
                    field: "evaluation.counts".to_string(),
                    value: raw.clone(),
                    reason,
                })?;
            // "user" 與 "users" 指向同一種類
            if parsed.iter().any(|(seen, _)| *seen == kind) {
                return Err(GateError::InvalidConfigValueError {
                    field: "evaluation.counts".to_string(),
                    value: raw.clone(),
                    reason: format!("'{}' is given more than once", kind),
                });
            }
            parsed.push((kind, *count));
        }
        Ok(parsed)
    }

    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_url("api.base_url", &self.api.base_url)?;
        crate::utils::validation::validate_endpoint_path(
            "api.subscription_path",
            self.subscription_path(),
        )?;
        crate::utils::validation::validate_endpoint_path("api.packages_path", self.packages_path())?;
        crate::utils::validation::validate_range(
            "api.timeout_seconds",
            self.timeout_seconds(),
            1,
            300,
        )?;
        self.counts()?;
        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
