use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Ballast layout error: {message}")]
    LayoutError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl OrderError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            OrderError::CsvError(_) | OrderError::LayoutError { .. } => ErrorCategory::Input,
            OrderError::IoError(_) | OrderError::SerializationError(_) => ErrorCategory::Output,
            OrderError::ConfigValidationError { .. }
            | OrderError::InvalidConfigValueError { .. }
            | OrderError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            OrderError::IoError(_) => ErrorSeverity::Critical,
            OrderError::SerializationError(_) => ErrorSeverity::Medium,
            _ => ErrorSeverity::High,
        }
    }

    /// 依錯誤類型給出修復建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            OrderError::CsvError(_) => {
                "Re-export the parts list to CSV and check that every row has numeric quantities and prices"
            }
            OrderError::IoError(_) => {
                "Make sure the input files exist and the output directory is writable"
            }
            OrderError::SerializationError(_) => "Check the order summary for unsupported values",
            OrderError::ConfigValidationError { .. }
            | OrderError::InvalidConfigValueError { .. }
            | OrderError::MissingConfigError { .. } => {
                "Fix the project file and run again (use --dry-run to check it without writing)"
            }
            OrderError::LayoutError { .. } => {
                "Ballast layouts may have at most 10 rows of 14 cells using '#' for a panel and '.' for empty"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            OrderError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                format!("Input file not found: {}", e)
            }
            OrderError::CsvError(e) => format!("The parts list could not be read: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = OrderError::MissingConfigError {
            field: "project.customer_name".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);

        let io = OrderError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "parts.csv"));
        assert_eq!(io.category(), ErrorCategory::Output);
        assert_eq!(io.severity(), ErrorSeverity::Critical);
        assert!(io.user_friendly_message().starts_with("Input file not found"));
    }
}
