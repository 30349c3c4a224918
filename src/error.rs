//! Error types for gridsync
//!
//! Structured error handling using thiserror. Protocol-level failures reported
//! by the host arrive as `show_error` pushes and are turned into alerts by the
//! controller; the variants here cover what the client and the reference host
//! detect locally.

use thiserror::Error;

/// Main error type for gridsync operations
#[derive(Error, Debug)]
pub enum GridError {
    /// File I/O error
    #[error("Failed to access file: {0}")]
    FileIo(#[from] std::io::Error),

    /// Polars data processing error
    #[error("Data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Options file or `change_grid_option` error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unsupported file format
    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    /// Column not known to the grid
    #[error("Column '{field}' not found")]
    UnknownColumn { field: String },

    /// Column exists but carries no filter
    #[error("Column '{field}' has no filter")]
    NotFilterable { field: String },

    /// Cell edit rejected before it reached the host
    #[error("Invalid value for column '{column}': {message}")]
    InvalidEdit { column: String, message: String },

    /// Add/remove requested while a previous one is still pending
    #[error("Cannot {requested} while the previous row operation is still in progress")]
    RowOperationInProgress { requested: String },

    /// Dataset has no rows or columns
    #[error("Dataset is empty or has no rows")]
    EmptyDataset,

    /// Failure raised while the host handled a request
    #[error("{0}")]
    Host(String),
}

/// Result type alias for gridsync operations
pub type Result<T> = std::result::Result<T, GridError>;

/// UI-friendly error message formatting
impl GridError {
    /// Get a user-friendly error message suitable for an alert
    pub fn user_message(&self) -> String {
        match self {
            GridError::FileIo(e) => format!("File error: {}", e),
            GridError::Polars(e) => format!("Data error: {}", e),
            GridError::Json(e) => format!("JSON error: {}", e),
            GridError::Config(msg) => format!("Config error: {}", msg),
            GridError::UnsupportedFormat { extension } => {
                format!("Unsupported file format: '.{}'", extension)
            }
            GridError::UnknownColumn { field } => format!("Column '{}' not found", field),
            GridError::NotFilterable { field } => {
                format!("Column '{}' cannot be filtered", field)
            }
            GridError::InvalidEdit { message, .. } => message.clone(),
            GridError::RowOperationInProgress { .. } => {
                "Adding/removing row is not available yet because the previous operation is still in progress."
                    .to_string()
            }
            GridError::EmptyDataset => "Dataset is empty".to_string(),
            GridError::Host(msg) => msg.clone(),
        }
    }

    /// Get a short title for the error (alert header)
    pub fn title(&self) -> &'static str {
        match self {
            GridError::FileIo(_) => "File Error",
            GridError::Polars(_) => "Data Error",
            GridError::Json(_) => "JSON Error",
            GridError::Config(_) => "Configuration Error",
            GridError::UnsupportedFormat { .. } => "Unsupported Format",
            GridError::UnknownColumn { .. } => "Column Not Found",
            GridError::NotFilterable { .. } => "Not Filterable",
            GridError::InvalidEdit { .. } => "Invalid Value",
            GridError::RowOperationInProgress { .. } => "Operation In Progress",
            GridError::EmptyDataset => "Empty Dataset",
            GridError::Host(_) => "Error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GridError::UnknownColumn {
            field: "Temperature".to_string(),
        };
        assert_eq!(err.user_message(), "Column 'Temperature' not found");
        assert_eq!(err.title(), "Column Not Found");

        let err = GridError::InvalidEdit {
            column: "D".to_string(),
            message: "Please enter a valid integer".to_string(),
        };
        assert_eq!(err.user_message(), "Please enter a valid integer");
        assert_eq!(
            err.to_string(),
            "Invalid value for column 'D': Please enter a valid integer"
        );
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let grid_err: GridError = io_err.into();
        assert!(matches!(grid_err, GridError::FileIo(_)));

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let grid_err: GridError = json_err.into();
        assert_eq!(grid_err.title(), "JSON Error");
    }
}
