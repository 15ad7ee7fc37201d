use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to parse response from {url}: {message}")]
    Parse { url: String, message: String },

    #[error("No records returned by {source_name}")]
    EmptyResult { source_name: String },

    #[error("{source_name} produced a record with {actual} fields, header has {expected}")]
    SchemaMismatch {
        source_name: String,
        expected: usize,
        actual: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Output,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScrapeError {
    pub fn parse(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) | Self::HttpStatus { .. } => ErrorCategory::Network,
            Self::Parse { .. }
            | Self::EmptyResult { .. }
            | Self::SchemaMismatch { .. }
            | Self::Serialization(_)
            | Self::ValidationError { .. } => ErrorCategory::Data,
            Self::Io(_) | Self::Xlsx(_) => ErrorCategory::Output,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::EmptyResult { .. } => ErrorSeverity::Low,
            Self::Fetch(_) | Self::HttpStatus { .. } => ErrorSeverity::Medium,
            Self::Parse { .. }
            | Self::SchemaMismatch { .. }
            | Self::Serialization(_)
            | Self::ValidationError { .. }
            | Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::High,
            Self::Io(_) | Self::Xlsx(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check your network connection and that the site is reachable, then rerun",
            ErrorCategory::Data => "The site may have changed its API or page layout; rerun with --verbose and inspect the response",
            ErrorCategory::Output => "Check that the output path exists and is writable",
            ErrorCategory::Configuration => "Fix the configuration file and try again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Fetch(e) => format!("Could not reach the site: {}", e),
            Self::HttpStatus { url, status } => {
                format!("The site answered {} for {}", status, url)
            }
            Self::EmptyResult { source_name } => {
                format!("{} returned no exhibitors", source_name)
            }
            Self::MissingConfigError { field } => {
                format!("The configuration is missing '{}'", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_category() {
        let empty = ScrapeError::EmptyResult {
            source_name: "ifema".to_string(),
        };
        assert_eq!(empty.category(), ErrorCategory::Data);
        assert_eq!(empty.severity(), ErrorSeverity::Low);

        let status = ScrapeError::HttpStatus {
            url: "https://example.com".to_string(),
            status: 503,
        };
        assert_eq!(status.category(), ErrorCategory::Network);
        assert_eq!(status.severity(), ErrorSeverity::Medium);

        let missing = ScrapeError::MissingConfigError {
            field: "source.tenant_id".to_string(),
        };
        assert_eq!(missing.category(), ErrorCategory::Configuration);
        assert!(missing.user_friendly_message().contains("source.tenant_id"));
    }

    #[test]
    fn test_parse_helper() {
        let err = ScrapeError::parse("https://example.com/api", "missing field `data`");
        assert_eq!(
            err.to_string(),
            "Failed to parse response from https://example.com/api: missing field `data`"
        );
    }
}
