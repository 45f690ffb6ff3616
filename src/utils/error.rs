use crate::domain::model::{OrderId, ProductId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContributionError {
    #[error("Unknown product {product_id} referenced by order {order_id}")]
    UnknownProduct {
        order_id: OrderId,
        product_id: ProductId,
    },

    #[error("Contribution overflow in order {order_id}, product {product_id}")]
    ContributionOverflow {
        order_id: OrderId,
        product_id: ProductId,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

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

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Data,
    Io,
    Catalog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ContributionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownProduct { .. } => ErrorCategory::Catalog,
            Self::IoError(_) => ErrorCategory::Io,
            Self::ContributionOverflow { .. }
            | Self::SerializationError(_)
            | Self::CsvError(_)
            | Self::ValidationError { .. }
            | Self::ProcessingError { .. } => ErrorCategory::Data,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 金額錯誤不可靜默忽略
            Self::UnknownProduct { .. } | Self::ContributionOverflow { .. } => {
                ErrorSeverity::Critical
            }
            Self::IoError(_) => ErrorSeverity::Critical,
            Self::SerializationError(_) | Self::CsvError(_) | Self::ValidationError { .. } => {
                ErrorSeverity::High
            }
            Self::ProcessingError { .. } => ErrorSeverity::Medium,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::UnknownProduct { product_id, .. } => format!(
                "Add product {} to the catalog snapshot or remove the order line referencing it",
                product_id
            ),
            Self::ContributionOverflow { order_id, .. } => format!(
                "Check the price and quantity of order {} in the snapshot",
                order_id
            ),
            Self::IoError(_) => "Check that the snapshot file exists and the output directory is writable".to_string(),
            Self::SerializationError(_) => "Check the snapshot JSON against the expected schema".to_string(),
            Self::CsvError(_) => "Check the output directory and retry the export".to_string(),
            Self::ConfigValidationError { field, .. }
            | Self::InvalidConfigValueError { field, .. }
            | Self::MissingConfigError { field } => {
                format!("Fix the '{}' setting in the configuration", field)
            }
            Self::ValidationError { .. } => "Correct the snapshot data and rerun".to_string(),
            Self::ProcessingError { .. } => "Check the requested view name and parameters".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::UnknownProduct { order_id, product_id } => format!(
                "Order {} references product {} which is not in the catalog; totals were not produced",
                order_id, product_id
            ),
            Self::ContributionOverflow { order_id, product_id } => format!(
                "Order {} line for product {} is too large to total; totals were not produced",
                order_id, product_id
            ),
            Self::IoError(e) => format!("Could not read or write a file: {}", e),
            Self::SerializationError(e) => format!("Snapshot data could not be parsed: {}", e),
            Self::CsvError(e) => format!("Report export failed: {}", e),
            Self::ConfigValidationError { field, message } => {
                format!("Configuration problem with '{}': {}", field, message)
            }
            Self::InvalidConfigValueError { field, value, reason } => {
                format!("'{}' has an invalid value '{}': {}", field, value, reason)
            }
            Self::MissingConfigError { field } => format!("'{}' must be provided", field),
            Self::ValidationError { message } => format!("Invalid snapshot data: {}", message),
            Self::ProcessingError { message } => message.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ContributionError>;
