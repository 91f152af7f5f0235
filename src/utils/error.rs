use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LearnPathError {
    #[error("Transport failure from {source_name}: {error}")]
    Transport {
        source_name: String,
        #[source]
        error: reqwest::Error,
    },

    #[error("{source_name} responded with HTTP {status}")]
    HttpStatus { source_name: String, status: u16 },

    #[error("Malformed payload from {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    #[error("{operation} timed out after {duration:?}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    #[error("Text generation is unavailable: {reason}")]
    GenerationUnavailable { reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid input '{field}': {message}")]
    InvalidInput { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transport,
    Parse,
    Configuration,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LearnPathError {
    pub fn transport(source_name: impl Into<String>, error: reqwest::Error) -> Self {
        Self::Transport {
            source_name: source_name.into(),
            error,
        }
    }

    pub fn parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport { .. }
            | Self::HttpStatus { .. }
            | Self::Timeout { .. }
            | Self::GenerationUnavailable { .. } => ErrorCategory::Transport,
            Self::Parse { .. } | Self::Serialization(_) => ErrorCategory::Parse,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::InvalidInput { .. } => ErrorCategory::Input,
            Self::Io(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 外部來源失敗一律走 fallback
            ErrorCategory::Transport | ErrorCategory::Parse => ErrorSeverity::Medium,
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 是否為呼叫者輸入錯誤（只影響 log 等級）
    pub fn is_caller_error(&self) -> bool {
        matches!(self.category(), ErrorCategory::Input)
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Transport { source_name, .. } | Self::HttpStatus { source_name, .. } => {
                format!("Could not reach {}", source_name)
            }
            Self::Parse { source_name, .. } => {
                format!("{} returned data in an unexpected format", source_name)
            }
            Self::Timeout { operation, .. } => format!("{} took too long to respond", operation),
            Self::GenerationUnavailable { .. } => {
                "AI features are disabled; showing standard results".to_string()
            }
            Self::ConfigValidationError { field, .. }
            | Self::InvalidConfigValueError { field, .. }
            | Self::MissingConfigError { field } => {
                format!("The configuration value '{}' is not usable", field)
            }
            Self::InvalidInput { field, message } => format!("Invalid {}: {}", field, message),
            Self::Serialization(_) | Self::Io(_) => "Something went wrong".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Transport => "Check network connectivity and the provider endpoints",
            ErrorCategory::Parse => "The upstream API may have changed; check the provider adapter",
            ErrorCategory::Configuration => "Fix the configuration file or environment variables",
            ErrorCategory::Input => "Correct the request parameters and try again",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, LearnPathError>;
