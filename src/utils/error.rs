use thiserror::Error;

#[derive(Error, Debug)]
pub enum GateError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned {status} for {url}")]
    HttpStatusError { status: u16, url: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GateError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GateError::ApiError(_) | GateError::HttpStatusError { .. } => ErrorCategory::Network,
            GateError::ConfigError { .. }
            | GateError::ConfigValidationError { .. }
            | GateError::InvalidConfigValueError { .. }
            | GateError::MissingConfigError { .. } => ErrorCategory::Configuration,
            GateError::SerializationError(_) => ErrorCategory::Data,
            GateError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路錯誤通常可以重試
            GateError::ApiError(_) => ErrorSeverity::Medium,
            GateError::HttpStatusError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            GateError::HttpStatusError { .. } => ErrorSeverity::High,
            GateError::SerializationError(_) => ErrorSeverity::High,
            GateError::ConfigError { .. }
            | GateError::ConfigValidationError { .. }
            | GateError::InvalidConfigValueError { .. }
            | GateError::MissingConfigError { .. } => ErrorSeverity::High,
            GateError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            GateError::ApiError(_) => {
                "Check network connectivity and that the API base URL is reachable".to_string()
            }
            GateError::HttpStatusError { status: 401, .. }
            | GateError::HttpStatusError { status: 403, .. } => {
                "Check that the access token is valid and not expired".to_string()
            }
            GateError::HttpStatusError { status: 404, .. } => {
                "Check the subscription and package endpoint paths".to_string()
            }
            GateError::HttpStatusError { .. } => "Retry later; the API may be unavailable".to_string(),
            GateError::SerializationError(_) => {
                "The API response did not match the expected { data: ... } envelope".to_string()
            }
            GateError::ConfigError { .. } | GateError::ConfigValidationError { .. } => {
                "Check the configuration file syntax and values".to_string()
            }
            GateError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}'", field)
            }
            GateError::MissingConfigError { field } => {
                format!("Provide '{}' on the command line or in the config file", field)
            }
            GateError::IoError(_) => "Check file paths and permissions".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the subscription API: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Data => format!("Unexpected data from the API: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, GateError>;
