use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid CSS selector '{selector}': {message}")]
    SelectorError { selector: String, message: String },

    #[error("Browser error: {message}")]
    BrowserError { message: String },

    #[error("Timed out after {waited:?} waiting for '{selector}'")]
    LoadTimeout { selector: String, waited: Duration },

    #[error("Notification failed: {message}")]
    NotificationError { message: String },

    #[error("Startup failed: {message}")]
    StartupError { message: String },
}

/// 錯誤嚴重程度，決定程式退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BotError {
    pub fn browser(message: impl Into<String>) -> Self {
        Self::BrowserError {
            message: message.into(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BotError::NotificationError { .. } => ErrorSeverity::Low,
            BotError::LoadTimeout { .. } | BotError::HttpError(_) => ErrorSeverity::Medium,
            BotError::ConfigError { .. }
            | BotError::MissingConfigError { .. }
            | BotError::InvalidConfigValueError { .. }
            | BotError::SelectorError { .. }
            | BotError::SerializationError(_) => ErrorSeverity::High,
            BotError::BrowserError { .. }
            | BotError::StartupError { .. }
            | BotError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// 迴圈內可自行恢復的錯誤 (重新載入頁面後再試)
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BotError::LoadTimeout { .. } | BotError::BrowserError { .. } | BotError::HttpError(_)
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            BotError::HttpError(_) => "Check network connectivity and retry",
            BotError::IoError(_) => "Check file paths and permissions",
            BotError::SerializationError(_) => "Check that the cookies file is a JSON array",
            BotError::ConfigError { .. }
            | BotError::MissingConfigError { .. }
            | BotError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or environment variables and restart"
            }
            BotError::SelectorError { .. } => "Fix the [page] selectors in the configuration",
            BotError::BrowserError { .. } | BotError::StartupError { .. } => {
                "Make sure Chrome/Chromium is installed or set browser.chrome_path"
            }
            BotError::LoadTimeout { .. } => "The site is slow; the poller retries automatically",
            BotError::NotificationError { .. } => "Check TELEGRAM_TOKEN and TELEGRAM_CHAT_ID",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_faults_are_critical() {
        let err = BotError::StartupError {
            message: "chrome not found".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
        assert!(!err.recovery_suggestion().is_empty());
    }

    #[test]
    fn test_config_errors_exit_with_one() {
        let err = BotError::MissingConfigError {
            field: "search.from_station".to_string(),
        };
        assert_eq!(err.exit_code(), 1);
        assert!(!err.is_transient());
    }

    #[test]
    fn test_load_timeout_is_transient() {
        let err = BotError::LoadTimeout {
            selector: ".train-result".to_string(),
            waited: Duration::from_secs(15),
        };
        assert!(err.is_transient());
        assert!(err.to_string().contains(".train-result"));
    }
}
